// Comes from https://github.com/inre/rust-mq/blob/master/netopt

use std::{
    io::{self, Cursor, Read, Write},
    sync::{Arc, Mutex},
};

pub(crate) type MockCursor = Cursor<Vec<u8>>;

/// In-memory stream replaying scripted relay replies and recording what the client writes
///
/// Clones share both buffers, so a clone kept by the test sees everything written through the
/// stream owned by the session.
#[derive(Clone, Debug)]
pub(crate) struct MockStream {
    reader: Arc<Mutex<MockCursor>>,
    writer: Arc<Mutex<MockCursor>>,
}

impl MockStream {
    pub(crate) fn new() -> MockStream {
        MockStream::with_vec(Vec::new())
    }

    pub(crate) fn with_vec(vec: Vec<u8>) -> MockStream {
        MockStream {
            reader: Arc::new(Mutex::new(MockCursor::new(vec))),
            writer: Arc::new(Mutex::new(MockCursor::new(Vec::new()))),
        }
    }

    /// Replays `replies`, one reply per line
    pub(crate) fn replying(replies: &[&str]) -> MockStream {
        let mut script = String::new();
        for reply in replies {
            script.push_str(reply);
            script.push_str("\r\n");
        }
        MockStream::with_vec(script.into_bytes())
    }

    pub(crate) fn take_vec(&mut self) -> Vec<u8> {
        let mut cursor = self.writer.lock().unwrap();
        let vec = cursor.get_ref().to_vec();
        cursor.set_position(0);
        cursor.get_mut().clear();
        vec
    }

    pub(crate) fn take_string(&mut self) -> String {
        String::from_utf8(self.take_vec()).unwrap()
    }
}

impl Write for MockStream {
    fn write(&mut self, msg: &[u8]) -> io::Result<usize> {
        self.writer.lock().unwrap().write(msg)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.lock().unwrap().flush()
    }
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.lock().unwrap().read(buf)
    }
}

#[cfg(test)]
mod test {
    use std::io::{Read, Write};

    use super::MockStream;

    #[test]
    fn write_take_test() {
        let mut mock = MockStream::new();
        mock.write_all(&[1, 2, 3]).unwrap();
        assert_eq!(mock.take_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn read_replies_test() {
        let mut mock = MockStream::replying(&["220 ready", "250 ok"]);
        let mut read = String::new();
        mock.read_to_string(&mut read).unwrap();
        assert_eq!(read, "220 ready\r\n250 ok\r\n");
    }

    #[test]
    fn clone_test() {
        let mut mock = MockStream::new();
        let mut cloned = mock.clone();
        mock.write_all(&[6, 7]).unwrap();
        assert_eq!(cloned.take_vec(), vec![6, 7]);
    }
}
