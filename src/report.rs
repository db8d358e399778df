/*!
Error reporting for the command-line driver.

Returning a [`Report`] from `main` prints the error message followed by every
error in its `source()` chain, instead of the bare `Debug` output.
*/

use std::error::Error as StdError;

pub struct Report(Box<dyn StdError + 'static>);

impl Report {
    /// Iterates over the causes of the reported error, outermost first.
    pub fn causes(&self) -> impl Iterator<Item = &(dyn StdError + 'static)> {
        std::iter::successors(self.0.source(), |e| (*e).source())
    }
}

impl std::fmt::Debug for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.0)?;

        let mut causes = self.causes().enumerate().peekable();
        if causes.peek().is_some() {
            writeln!(f, "\nCaused by:")?;
            for (i, e) in causes {
                writeln!(f, "  {}: {}", i, e)?;
            }
        }

        Ok(())
    }
}

impl<E: StdError + 'static> From<E> for Report {
    fn from(e: E) -> Self {
        Report(Box::new(e))
    }
}
