pub mod audio;
pub mod midi;
pub mod note;
pub mod pointer;
pub mod synth;
