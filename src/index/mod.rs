pub mod esa;
pub mod lcp;
pub mod qgram;
pub mod skew7;
pub mod text;
pub mod traverse;
