/// Text device the kernel writes program output and system messages to.
///
/// Rendering, wrapping and scrolling are the implementor's business; the
/// kernel only hands over text in the order it was produced.
pub trait Console {
    fn put_text(&mut self, text: &str);

    fn put_line(&mut self, line: &str) {
        self.put_text(line);
        self.put_text("\n");
    }

    /// A character delivered by a keyboard interrupt.
    fn key_pressed(&mut self, ch: char);
}

/// Console that keeps everything in memory.
#[derive(Clone, Debug, Default)]
pub struct BufferConsole {
    output: String,
    keys: Vec<char>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn keys(&self) -> &[char] {
        &self.keys
    }

    /// Returns the output written so far and starts a fresh buffer.
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }
}

impl Console for BufferConsole {
    fn put_text(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn key_pressed(&mut self, ch: char) {
        self.keys.push(ch);
    }
}
