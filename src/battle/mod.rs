pub mod action_order;
pub mod ai;
pub mod animation;
pub mod calculators;
pub mod coordinator;
pub mod decoration;
pub mod effects;
pub mod fainting;
pub mod flee;
pub mod rng;
pub mod selectors;
pub mod sequencer;
pub mod state;

#[cfg(test)]
mod tests;
