//! Shape wrapper

use contracts::ObjectKind;

use crate::object::ObjectRef;
use crate::typed_view::ObjectType;

/// Rigid shape; carries no operations beyond identity
#[derive(Debug, Clone)]
pub struct Shape {
    object: ObjectRef,
}

impl ObjectType for Shape {
    const LABEL: &'static str = "shape";

    fn accepts(kind: ObjectKind) -> bool {
        kind == ObjectKind::Shape
    }

    fn from_object(object: ObjectRef) -> Self {
        Self { object }
    }

    fn object(&self) -> &ObjectRef {
        &self.object
    }
}
