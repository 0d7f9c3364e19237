/// Path-side decoration variant, fixed when the decoration is created.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DecorationKind {
    Stone,
    Flower,
    Grass,
}
