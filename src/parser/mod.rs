//! Load file reading: delimiter profiles, field tokenizing and record streams.

mod delimiters;
mod options;
mod reader;
mod tokenizer;

pub use delimiters::Delimiters;
pub use options::{
    DelimitedOptions, ImageOptions, RepresentativeNames, RepresentativeSetting, TextLevel,
    TextLocation, TextSetting, DEFAULT_CHILD_SEPARATOR, DEFAULT_TEXT_EXTENSION,
};
pub use reader::{Record, RecordReader};
pub use tokenizer::FieldTokenizer;
