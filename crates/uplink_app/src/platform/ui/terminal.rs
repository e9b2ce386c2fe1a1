use std::io::{self, Write};

use super::render::Block;

/// Append-only terminal output: a block is printed in full whenever it
/// differs from the block at the same position in the previous frame.
pub struct Terminal<W: Write> {
    out: W,
    last_frame: Vec<Block>,
}

impl Terminal<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Terminal<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_frame: Vec::new(),
        }
    }

    pub fn draw(&mut self, frame: Vec<Block>) -> io::Result<()> {
        if frame == self.last_frame {
            return Ok(());
        }
        for (index, block) in frame.iter().enumerate() {
            if self.last_frame.get(index) == Some(block) {
                continue;
            }
            for line in block {
                writeln!(self.out, "{line}")?;
            }
        }
        self.out.flush()?;
        self.last_frame = frame;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }
}
