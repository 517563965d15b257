pub mod forecast;
pub mod location;
pub mod observation;
pub mod station;
