//! MFCC feature extraction.

pub mod mel;
mod mfcc;

pub use mfcc::{mfcc_frames, mfcc_mean};
