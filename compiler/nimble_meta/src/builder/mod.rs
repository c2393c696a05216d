//! Type definition builder.
//!
//! The host describes each of its types once through a [`TypeBuilder`].
//! The type descriptor is allocated up front so that members (and member
//! bodies) can refer to the declaring type, including recursively, before
//! the definition is complete. [`TypeBuilder::finish`] installs the member
//! tables; after that the descriptor is immutable.
//!
//! Descriptors are leaked: type metadata lives as long as the process.

use std::borrow::Cow;
use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::errors::{DefineError, InvokeError};
use crate::members::{
    ConstructorInfo, CtorRef, FieldInfo, FieldRef, FieldStorage, Frame, MemberFlags, MethodInfo,
    MethodRef, ParamInfo, PropertyInfo, PropertyRef,
};
use crate::types::{builtins, Members, TypeInfo, TypeKind, TypeRef};
use crate::value::Slot;

fn leak<T: 'static>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

/// Builder for one user-defined type.
pub struct TypeBuilder {
    ty: TypeRef,
    fields: Vec<FieldRef>,
    constructors: Vec<CtorRef>,
    methods: Vec<MethodRef>,
    properties: Vec<PropertyRef>,
    layout: Vec<TypeRef>,
    /// Whether the base layout was complete when it was copied.
    base_ready: bool,
}

impl TypeBuilder {
    /// A reference type deriving from `Object`.
    pub fn class(name: impl Into<Cow<'static, str>>) -> Self {
        Self::derived(name, &builtins::OBJECT)
    }

    /// A reference type deriving from `base`. Instance fields of `base` come first.
    pub fn derived(name: impl Into<Cow<'static, str>>, base: TypeRef) -> Self {
        let ty = leak(TypeInfo::user(name.into(), TypeKind::Class, Some(base)));
        let mut builder = Self::start(ty, base.instance_layout().to_vec());
        builder.base_ready = base.kind() != TypeKind::Class || base.is_finished();
        builder
    }

    /// A user-defined value type.
    pub fn value_type(name: impl Into<Cow<'static, str>>) -> Self {
        let ty = leak(TypeInfo::user(name.into(), TypeKind::Struct, None));
        Self::start(ty, Vec::new())
    }

    fn start(ty: TypeRef, layout: Vec<TypeRef>) -> Self {
        TypeBuilder {
            ty,
            fields: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            layout,
            base_ready: true,
        }
    }

    /// The type being defined. Usable in member signatures before `finish`.
    pub fn ty(&self) -> TypeRef {
        self.ty
    }

    /// Declare a field. Instance fields get the next slot in the layout.
    pub fn field(
        &mut self,
        name: impl Into<String>,
        ty: TypeRef,
        flags: MemberFlags,
    ) -> FieldRef {
        let storage = if flags.contains(MemberFlags::STATIC) {
            FieldStorage::Static(OnceLock::new())
        } else {
            self.layout.push(ty);
            FieldStorage::Instance(self.layout.len() - 1)
        };
        let field = leak(FieldInfo {
            name: name.into(),
            declaring: self.ty,
            ty,
            flags,
            storage,
        });
        self.fields.push(field);
        field
    }

    /// Declare a constructor whose initializer runs on a default-initialised instance.
    pub fn constructor(
        &mut self,
        params: Vec<ParamInfo>,
        flags: MemberFlags,
        init: impl Fn(&Frame<'_>) -> Result<(), InvokeError> + Send + Sync + 'static,
    ) -> CtorRef {
        let ctor = leak(ConstructorInfo {
            declaring: self.ty,
            params,
            flags,
            init: Box::new(init),
        });
        self.constructors.push(ctor);
        ctor
    }

    /// Declare a method. `ret` is `builtins::VOID` for methods without a result.
    pub fn method(
        &mut self,
        name: impl Into<String>,
        params: Vec<ParamInfo>,
        ret: TypeRef,
        flags: MemberFlags,
        body: impl Fn(&Frame<'_>) -> Result<Slot, InvokeError> + Send + Sync + 'static,
    ) -> MethodRef {
        let method = leak(MethodInfo {
            name: name.into(),
            declaring: self.ty,
            params,
            ret,
            flags,
            body: Box::new(body),
        });
        self.methods.push(method);
        method
    }

    /// Declare a property over already declared accessor methods.
    pub fn property(
        &mut self,
        name: impl Into<String>,
        ty: TypeRef,
        index_params: Vec<ParamInfo>,
        getter: Option<MethodRef>,
        setter: Option<MethodRef>,
    ) -> PropertyRef {
        let property = leak(PropertyInfo {
            name: name.into(),
            declaring: self.ty,
            ty,
            index_params,
            getter,
            setter,
        });
        self.properties.push(property);
        property
    }

    /// Validate the definition and install the member tables.
    pub fn finish(self) -> Result<TypeRef, DefineError> {
        self.validate()?;
        let ty = self.ty;

        let mut field_index = FxHashMap::default();
        for (i, field) in self.fields.iter().enumerate() {
            field_index.entry(field.name.clone()).or_insert(i);
        }
        let mut method_index: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (i, method) in self.methods.iter().enumerate() {
            method_index.entry(method.name.clone()).or_default().push(i);
        }
        let mut property_index = FxHashMap::default();
        for (i, property) in self.properties.iter().enumerate() {
            property_index.entry(property.name.clone()).or_insert(i);
        }

        debug!(
            ty = %ty,
            fields = self.fields.len(),
            constructors = self.constructors.len(),
            methods = self.methods.len(),
            properties = self.properties.len(),
            "defined type"
        );

        let installed = ty.install(Members {
            fields: self.fields,
            constructors: self.constructors,
            methods: self.methods,
            properties: self.properties,
            layout: self.layout,
            field_index,
            method_index,
            property_index,
        });
        debug_assert!(installed, "type {ty} finished twice");
        Ok(ty)
    }

    fn validate(&self) -> Result<(), DefineError> {
        if let Some(base) = self.ty.base() {
            if !matches!(base.kind(), TypeKind::Class | TypeKind::Object) {
                return Err(DefineError::InvalidBase {
                    type_name: self.ty.name().to_string(),
                    base: base.name().to_string(),
                });
            }
            if !self.base_ready {
                return Err(DefineError::UnfinishedBase {
                    type_name: self.ty.name().to_string(),
                    base: base.name().to_string(),
                });
            }
        }
        if self.ty.kind() == TypeKind::Struct {
            // A struct field of an unfinished struct type could close a cycle.
            let recursive = self.fields.iter().find(|f| {
                !f.is_static() && f.ty.kind() == TypeKind::Struct && !f.ty.is_finished()
            });
            if let Some(field) = recursive {
                return Err(DefineError::RecursiveValueType {
                    type_name: self.ty.name().to_string(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}
