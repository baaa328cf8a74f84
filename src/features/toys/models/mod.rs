mod toy;

pub use toy::{CategoryRef, NewToy, Toy, ToySummary};
