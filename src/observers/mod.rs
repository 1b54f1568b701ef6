// Consumers of simulation frames

pub mod colormap;
pub mod imgstream;
