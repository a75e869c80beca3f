use std::fmt::Display;

#[derive(Debug)]
pub enum MpmError {
    Input(String),
    Mesher(String),
    Generator(String),
    Output(String),
}

impl Display for MpmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (err_name, value) = match self {
            MpmError::Input(v) => ("Input", v),
            MpmError::Mesher(v) => ("Mesher", v),
            MpmError::Generator(v) => ("Generator", v),
            MpmError::Output(v) => ("Output", v),
        };

        write!(f, "{} error: {}", err_name, value)
    }
}
