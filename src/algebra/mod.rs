mod derivative;
mod index;
mod number;
mod operator;
mod tensor;

pub use derivative::*;
pub use index::*;
pub use number::*;
pub use operator::*;
pub use tensor::*;
