use std::fmt;

/// Where a batch of raw images came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    FilePicker,
    Camera,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::FilePicker => write!(f, "file-picker"),
            InputSource::Camera => write!(f, "camera"),
        }
    }
}

/// Undecoded bytes handed over by a file or camera chooser. Consumed once.
#[derive(Clone, PartialEq, Eq)]
pub struct RawImageInput {
    /// Display name used in logs (usually the file name).
    pub label: String,
    /// Declared media type, e.g. `image/png`. `None` means sniff from the bytes.
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl RawImageInput {
    pub fn new(label: impl Into<String>, media_type: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            media_type,
            bytes,
        }
    }
}

// Raw payloads can be megabytes; keep them out of debug output.
impl fmt::Debug for RawImageInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawImageInput")
            .field("label", &self.label)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A re-encoded, dimension-bounded image. Immutable once produced.
#[derive(Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    data_url: String,
    width: u32,
    height: u32,
}

impl NormalizedImage {
    pub fn new(data_url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            data_url: data_url.into(),
            width,
            height,
        }
    }

    /// Self-contained encoded form, e.g. `data:image/jpeg;base64,...`.
    pub fn data_url(&self) -> &str {
        &self.data_url
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn into_data_url(self) -> String {
        self.data_url
    }
}

impl fmt::Debug for NormalizedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("encoded_len", &self.data_url.len())
            .finish()
    }
}

/// Ordered list of normalized images. Insertion order is display order and
/// duplicates are allowed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImageCollection {
    images: Vec<NormalizedImage>,
}

impl ImageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a batch to the end, keeping the batch's order.
    pub fn append<I>(&mut self, images: I)
    where
        I: IntoIterator<Item = NormalizedImage>,
    {
        self.images.extend(images);
    }

    /// Removes the image at `index`. Out-of-range indices leave the collection
    /// untouched; the return value reports whether anything was removed.
    pub fn remove_at(&mut self, index: usize) -> bool {
        if index < self.images.len() {
            self.images.remove(index);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedImage> {
        self.images.iter()
    }

    pub fn as_slice(&self) -> &[NormalizedImage] {
        &self.images
    }

    pub fn to_list(&self) -> Vec<NormalizedImage> {
        self.images.clone()
    }
}

impl<'a> IntoIterator for &'a ImageCollection {
    type Item = &'a NormalizedImage;
    type IntoIter = std::slice::Iter<'a, NormalizedImage>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}
