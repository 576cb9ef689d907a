use crate::core::models::contact::{ContactRecord, ContactRecordTable};
use crate::core::models::timestep::SimulationTimestep;
use nalgebra::distance;
use tracing::debug;

/// Spatial contacts of a simulated structure.
///
/// Every unordered pair of atoms `i < j` (in row order) closer than
/// `distance_threshold`, but not coincident, becomes a record
/// `(id_i, id_j, distance)`. Records are emitted in ascending `(i, j)` order.
pub fn build_contact_map(timestep: &SimulationTimestep, distance_threshold: f64) -> ContactRecordTable {
    let atoms = timestep.atoms();
    let mut table = ContactRecordTable::new();

    for (i, a) in atoms.iter().enumerate() {
        for b in &atoms[i + 1..] {
            let d = distance(&a.position, &b.position);
            if d > 0.0 && d < distance_threshold {
                table.push(ContactRecord::new(a.id, b.id, d));
            }
        }
    }

    debug!(
        atoms = atoms.len(),
        contacts = table.len(),
        distance_threshold,
        "Built spatial contact map"
    );
    table
}
