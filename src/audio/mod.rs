pub mod decode;
pub mod window;
