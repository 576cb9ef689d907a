pub mod contacts;
pub mod deck;
pub mod inspect;
pub mod run;
