//! Field-type descriptor: the static, `Copy` handle to a field-type subtype.

use std::any::{TypeId, type_name};
use std::path::PathBuf;

use super::{FieldType, FieldTypeClass, VIEW_TEMPLATE_FILE};

/// Identifies a field-type subtype and knows how to instantiate it.
///
/// Built with [`FieldTypeDescriptor::of`]; all fields are derived from the
/// type's [`FieldTypeClass`] implementation.
#[derive(Debug, Clone, Copy)]
pub struct FieldTypeDescriptor {
    /// [`FieldTypeClass::TYPE_KEY`] of the subtype.
    pub type_key: &'static str,

    /// Rust type name, for logs.
    pub type_name: &'static str,

    /// Key of the subtype in the routing cache.
    pub type_id: TypeId,

    /// [`FieldTypeClass::this_path`] of the subtype.
    pub this_path: fn() -> PathBuf,

    /// Creates a fresh instance with default attributes.
    pub create: fn() -> Box<dyn FieldType>,
}

impl FieldTypeDescriptor {
    /// Describes the subtype `T`.
    pub fn of<T>() -> Self
    where
        T: FieldTypeClass + FieldType + Default,
    {
        Self {
            type_key: T::TYPE_KEY,
            type_name: type_name::<T>(),
            type_id: TypeId::of::<T>(),
            this_path: T::this_path,
            create: create_boxed::<T>,
        }
    }

    /// Creates a new instance with its key set to the subtype key.
    pub fn instantiate(&self) -> Box<dyn FieldType> {
        let mut field = (self.create)();
        field.attrs_mut().set_key(self.type_key);
        field
    }

    /// Directory of the subtype.
    #[inline]
    pub fn this_path(&self) -> PathBuf {
        (self.this_path)()
    }

    /// View template path of the subtype.
    pub fn this_path_view(&self) -> PathBuf {
        self.this_path().join(VIEW_TEMPLATE_FILE)
    }
}

fn create_boxed<T: FieldType + Default + 'static>() -> Box<dyn FieldType> {
    Box::new(T::default())
}
