//! Task status and file type enums with their wire labels.
//!
//! The enums themselves carry no serialization attributes. The label table
//! generated by [`define_label_enum!`] is the only place where a variant is
//! mapped to or from its string form, and it is used at the HTTP and
//! database boundaries.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

macro_rules! define_label_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $label:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Return the wire label for this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $label ),+
                }
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            /// Parse a wire label. Matching is case-insensitive so that both
            /// `"video"` and `"VIDEO"` are accepted from query strings.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($label)
                        || s.eq_ignore_ascii_case(stringify!($variant))
                    {
                        return Ok($name::$variant);
                    }
                )+
                Err(CoreError::Validation(format!(
                    "Unknown {}: '{s}'",
                    stringify!($name)
                )))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

define_label_enum! {
    /// Kind of media a submitted file contains.
    FileType {
        Image = "image",
        Video = "video",
        Audio = "audio",
        Unknown = "unknown",
    }
}

define_label_enum! {
    /// Lifecycle state of a processing task.
    ///
    /// Transitions only `Uploading -> Success` or `Uploading -> Failed`.
    TaskStatus {
        Uploading = "uploading",
        Success = "success",
        Failed = "fail",
    }
}

impl TaskStatus {
    /// `true` for `Success` and `Failed`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskStatus::Uploading)
    }
}

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "webp"];
const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "m4a", "ogg"];

/// Detect the file type from a file name's extension.
///
/// Names without a recognised extension map to [`FileType::Unknown`].
pub fn detect_file_type(file_name: &str) -> FileType {
    let ext = match file_name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return FileType::Unknown,
    };

    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        FileType::Video
    } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        FileType::Image
    } else if AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        FileType::Audio
    } else {
        FileType::Unknown
    }
}
