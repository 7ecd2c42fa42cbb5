//! Reliable writer: push a whole buffer onto a descriptor or fail.

use std::io;

use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Write all of `buf` to `writer`.
///
/// Interrupted writes are resumed. Any other failure, or a writer that stops
/// accepting bytes, aborts the write with an error; a partial write is never
/// reported as success.
pub async fn write_fully<W>(writer: &mut W, buf: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]).await {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Writer that replays a script of results, accepting at most `step`
    /// bytes per successful call. `Ok(_)` entries just let the call through.
    struct ScriptedWriter {
        script: VecDeque<io::Result<usize>>,
        step: usize,
        data: Vec<u8>,
    }

    impl ScriptedWriter {
        fn new(step: usize, script: Vec<io::Result<usize>>) -> Self {
            Self {
                script: script.into(),
                step,
                data: Vec::new(),
            }
        }
    }

    impl AsyncWrite for ScriptedWriter {
        fn poll_write(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            if let Some(next) = self.script.pop_front() {
                if let Err(e) = next {
                    return Poll::Ready(Err(e));
                }
            }
            let n = buf.len().min(self.step);
            self.data.extend_from_slice(&buf[..n]);
            Poll::Ready(Ok(n))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn short_writes_are_continued() {
        let mut w = ScriptedWriter::new(3, Vec::new());
        let payload: Vec<u8> = (0u8..=255).collect();
        write_fully(&mut w, &payload).await.unwrap();
        assert_eq!(w.data, payload);
    }

    #[tokio::test]
    async fn interrupted_write_is_resumed() {
        let mut w = ScriptedWriter::new(
            4,
            vec![
                Err(io::ErrorKind::Interrupted.into()),
                Ok(0),
                Err(io::ErrorKind::Interrupted.into()),
            ],
        );
        write_fully(&mut w, b"echo hi\n").await.unwrap();
        assert_eq!(w.data, b"echo hi\n");
    }

    #[tokio::test]
    async fn other_errors_abort() {
        let mut w = ScriptedWriter::new(2, vec![Ok(0), Err(io::ErrorKind::BrokenPipe.into())]);
        let err = write_fully(&mut w, b"abcdef").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(w.data, b"ab");
    }

    #[tokio::test]
    async fn zero_length_write_is_an_error() {
        let mut w = ScriptedWriter::new(0, Vec::new());
        let err = write_fully(&mut w, b"x").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[tokio::test]
    async fn empty_buffer_is_a_no_op() {
        let mut w = ScriptedWriter::new(0, Vec::new());
        write_fully(&mut w, b"").await.unwrap();
        assert!(w.data.is_empty());
    }
}
