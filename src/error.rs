use std::{collections::BTreeMap, fmt, io, sync::Arc};

use thiserror::Error;

/// Initialization error. Every startup step returns one of these; `main`
/// reports it once and terminates the process.
#[derive(Debug, Clone)]
pub struct RtError {
    pub key: &'static str,
    pub args: BTreeMap<&'static str, String>,
    pub causes: Vec<RtCause>,
}

#[derive(Debug, Clone)]
pub enum RtCause {
    Rt(Box<RtError>),
    Std(Arc<dyn std::error::Error + Send + Sync>),
}

impl RtError {
    pub fn new(key: &'static str) -> Self {
        Self {
            key,
            args: BTreeMap::new(),
            causes: Vec::new(),
        }
    }

    pub fn with_arg(mut self, k: &'static str, v: impl ToString) -> Self {
        self.args.insert(k, v.to_string());
        self
    }

    pub fn push_rt(mut self, cause: RtError) -> Self {
        self.causes.push(RtCause::Rt(Box::new(cause)));
        self
    }

    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(RtCause::Std(Arc::new(cause)));
        self
    }
}

impl fmt::Display for RtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.key)?;
        let mut first = true;
        for (k, v) in &self.args {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{k}={v}")?;
        }
        write!(f, ")")?;
        for cause in &self.causes {
            match cause {
                RtCause::Rt(e) => write!(f, " <- {e}")?,
                RtCause::Std(e) => write!(f, " <- {e}")?,
            }
        }
        Ok(())
    }
}

impl std::error::Error for RtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes.iter().find_map(|c| match c {
            RtCause::Rt(e) => Some(e.as_ref() as &dyn std::error::Error),
            RtCause::Std(e) => Some(e.as_ref() as &(dyn std::error::Error + 'static)),
        })
    }
}

impl From<io::Error> for RtError {
    fn from(err: io::Error) -> Self {
        RtError::new("io-error").push_std(err)
    }
}

impl From<glutin::error::Error> for RtError {
    fn from(err: glutin::error::Error) -> Self {
        RtError::new("glutin::error::Error").push_std(err)
    }
}

impl From<raw_window_handle::HandleError> for RtError {
    fn from(err: raw_window_handle::HandleError) -> Self {
        RtError::new("raw_window_handle::HandleError").push_std(err)
    }
}

impl From<winit::error::EventLoopError> for RtError {
    fn from(err: winit::error::EventLoopError) -> Self {
        RtError::new("winit::error::EventLoopError").push_std(err)
    }
}

/// Recoverable fault raised while producing or consuming a single frame.
/// The caller logs it and skips the frame.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameFault {
    #[error("frame target has not been prepared")]
    NotPrepared,
    #[error("no presentation program is loaded")]
    NoPresentation,
    #[error("GL error 0x{code:04x} after {stage}")]
    Gpu { code: u32, stage: &'static str },
}
