use std::io::Write;

use async_trait::async_trait;

use crate::types::ClientError;

/// Output surface for rendered screens.
#[async_trait]
pub trait Display: Send {
    async fn show(&mut self, lines: &[String]) -> Result<(), ClientError>;
}

/// Text console standing in for the e-ink panel.
pub struct ConsoleDisplay<W> {
    out: W,
}

impl ConsoleDisplay<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> ConsoleDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

#[async_trait]
impl<W: Write + Send> Display for ConsoleDisplay<W> {
    async fn show(&mut self, lines: &[String]) -> Result<(), ClientError> {
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Keeps every screen it was asked to show.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingDisplay {
    pub screens: Vec<Vec<String>>,
}

#[cfg(test)]
#[async_trait]
impl Display for RecordingDisplay {
    async fn show(&mut self, lines: &[String]) -> Result<(), ClientError> {
        self.screens.push(lines.to_vec());
        Ok(())
    }
}
