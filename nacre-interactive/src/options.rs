/// Options for the interactive read loop.
#[derive(Clone, Debug)]
pub struct Options {
    /// The prompt displayed before each line is read.
    pub prompt: String,
    /// Whether to display prompts at all; typically only when reading from a terminal.
    pub show_prompt: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prompt: "nacre$ ".into(),
            show_prompt: false,
        }
    }
}
