use alloc::borrow::Cow;
use alloc::string::String;
use core::any::TypeId;
use core::fmt;

/// Location of a row: `(section, row)`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexPath {
    pub section: usize,
    pub row: usize,
}

impl IndexPath {
    pub const fn new(section: usize, row: usize) -> Self {
        Self { section, row }
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.row)
    }
}

/// Identity of a live view instance handed out by the host surface.
///
/// Two handles with the same id refer to the same recycled view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewId(pub u64);

/// How a row's view reacts visually to selection. Interpreted by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SelectionStyle {
    #[default]
    None,
    Default,
    Highlight,
}

/// The key the host uses to pick a pool of recyclable views.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReuseIdentifier(Cow<'static, str>);

impl ReuseIdentifier {
    pub const fn from_static(identifier: &'static str) -> Self {
        Self(Cow::Borrowed(identifier))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&'static str> for ReuseIdentifier {
    fn from(identifier: &'static str) -> Self {
        Self(Cow::Borrowed(identifier))
    }
}

impl From<String> for ReuseIdentifier {
    fn from(identifier: String) -> Self {
        Self(Cow::Owned(identifier))
    }
}

impl fmt::Debug for ReuseIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for ReuseIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes which concrete view type a row or header needs.
///
/// The host maps a `ViewType` to whatever constructs views of that type. Its default reuse
/// identifier is the Rust type name.
#[derive(Clone, Copy)]
pub struct ViewType {
    id: TypeId,
    name: &'static str,
}

impl ViewType {
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn reuse_identifier(&self) -> ReuseIdentifier {
        ReuseIdentifier::from_static(self.name)
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for ViewType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ViewType {}

impl fmt::Debug for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ViewType").field(&self.name).finish()
    }
}

/// Marker view type used for index paths that resolve to no row.
///
/// The data source registers it on attach under
/// [`crate::DataSourceOptions::fallback_identifier`], so the host can always dequeue a view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FallbackView;
