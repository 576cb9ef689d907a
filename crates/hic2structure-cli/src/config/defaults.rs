pub struct DefaultsConfig {
    pub chromosome: String,
    pub resolution: i32,
    pub count_threshold: f64,
    pub distance_threshold: f64,
    pub bond_coeff: f64,
    pub timesteps: u64,
    pub lammps: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            chromosome: "X".to_string(),
            resolution: 250_000,
            count_threshold: 2.0,
            distance_threshold: 3.3,
            bond_coeff: 55.0,
            timesteps: 1_000_000,
            lammps: "lmp".to_string(),
        }
    }
}
