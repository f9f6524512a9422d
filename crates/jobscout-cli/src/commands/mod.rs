pub mod batch;
pub mod process;
pub mod retrain;
pub mod score_channels;
pub mod serve;
pub mod verify;
