use std::{borrow::Cow, error::Error, fmt};

#[derive(Clone, Debug)]
/// A tree the printer wasn't prepared for.
pub struct InternalError {
    pub kind: InternalErrorKind,
    pub pos: usize,
}

#[derive(Clone, Debug)]
pub enum InternalErrorKind {
    /// `<svelte:options>` reached the node printer although
    /// section sorting should have relocated it.
    UnexpectedOptions,
}

impl fmt::Display for InternalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason: Cow<_> = match self.kind {
            InternalErrorKind::UnexpectedOptions => {
                "`<svelte:options>` must be a top-level node when sections are sorted".into()
            }
        };

        write!(f, "internal error '{reason}' at position {}", self.pos)
    }
}

impl Error for InternalError {}

#[derive(Debug)]
/// The error type for svelte_fmt.
pub enum FormatError<E> {
    /// Errors from external formatter, for example,
    /// there're errors when formatting the `<script>` or `<style>` tag.
    External(Vec<E>),
    Internal(InternalError),
}

impl<E> fmt::Display for FormatError<E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::External(errors) => {
                writeln!(f, "failed to format code with external formatter:")?;
                for error in errors {
                    writeln!(f, "{error}")?;
                }
                Ok(())
            }
            FormatError::Internal(error) => error.fmt(f),
        }
    }
}

impl<E> Error for FormatError<E> where E: Error {}
