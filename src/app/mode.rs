use std::path::PathBuf;

/// Execution mode, fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Render one frame offscreen, write it to `output`, exit.
    Capture { output: PathBuf },
    /// Render to a window until it is closed.
    Interactive,
}

impl Mode {
    /// Select the mode from the user arguments (program name excluded).
    ///
    /// No arguments runs interactively. Any first argument selects capture;
    /// a second argument names the output file, else `default_output` is used.
    pub fn from_args<I, S>(args: I, default_output: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.len() > 2 {
            log::warn!("Ignoring extra arguments: {:?}", &args[2..]);
        }
        match args.as_slice() {
            [] => Mode::Interactive,
            [_] => Mode::Capture {
                output: PathBuf::from(default_output),
            },
            [_, output, ..] => Mode::Capture {
                output: PathBuf::from(output),
            },
        }
    }
}
