pub mod golden_path;
pub mod validator;
