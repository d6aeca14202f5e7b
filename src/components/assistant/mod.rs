mod rig_model;

pub use rig_model::RigLanguageModel;
