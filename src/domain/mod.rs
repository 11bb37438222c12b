// Domain layer - Sample evaluation rules and record shapes
pub mod evaluation;
pub mod rules;
pub mod sample;
pub mod stored_reading;
