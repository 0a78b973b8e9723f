pub mod conditioner;
pub mod noise_suppression;
pub mod push_to_talk;
pub mod segment_assembler;
