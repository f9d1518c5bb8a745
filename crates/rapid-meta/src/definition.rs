//! Type definition builders
//!
//! Definitions describe a type before it is frozen into a registry by
//! [`TypeRegistryBuilder::define`](crate::registry::TypeRegistryBuilder::define).

use crate::error::RuntimeError;
use crate::handle::TypeHandle;
use crate::member::Visibility;
use crate::native::{self, Invocation, NativeConstructor, NativeMethod};
use crate::types::TypeKind;
use crate::value::Value;

/// Definition for a field
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Field name
    pub name: String,
    /// Field type
    pub field_type: TypeHandle,
    /// Field visibility
    pub visibility: Visibility,
    /// Whether this is a static field
    pub is_static: bool,
    /// Initial value (zero value of the field type if none)
    pub initial_value: Option<Value>,
}

impl FieldDefinition {
    /// Create a new public instance field definition
    pub fn new(name: impl Into<String>, field_type: TypeHandle) -> Self {
        Self {
            name: name.into(),
            field_type,
            visibility: Visibility::Public,
            is_static: false,
            initial_value: None,
        }
    }

    /// Set initial value
    pub fn initial_value(mut self, value: impl Into<Value>) -> Self {
        self.initial_value = Some(value.into());
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Set visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as private
    pub fn private(self) -> Self {
        self.with_visibility(Visibility::Private)
    }
}

/// Definition for a parameter
#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub parameter_type: TypeHandle,
}

/// How a method participates in dynamic dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dispatch {
    /// Bound statically
    #[default]
    Direct,
    /// Opens a new virtual slot
    Virtual,
    /// Replaces an inherited virtual slot
    Override,
}

/// Definition for a method
#[derive(Clone)]
pub struct MethodDefinition {
    /// Method name
    pub name: String,
    /// Parameters
    pub parameters: Vec<ParameterDefinition>,
    /// Return type
    pub return_type: TypeHandle,
    /// Method visibility
    pub visibility: Visibility,
    /// Whether the method is static
    pub is_static: bool,
    /// Dispatch mode
    pub dispatch: Dispatch,
    /// Implementation, `None` for abstract methods
    pub body: Option<NativeMethod>,
}

impl MethodDefinition {
    /// Create a new public, non-virtual, void method definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
            return_type: TypeHandle::VOID,
            visibility: Visibility::Public,
            is_static: false,
            dispatch: Dispatch::Direct,
            body: None,
        }
    }

    /// Add a parameter
    pub fn param(mut self, name: impl Into<String>, parameter_type: TypeHandle) -> Self {
        self.parameters.push(ParameterDefinition {
            name: name.into(),
            parameter_type,
        });
        self
    }

    /// Set return type
    pub fn returns(mut self, return_type: TypeHandle) -> Self {
        self.return_type = return_type;
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Open a new virtual slot
    pub fn as_virtual(mut self) -> Self {
        self.dispatch = Dispatch::Virtual;
        self
    }

    /// Override an inherited virtual method with the same signature
    pub fn as_override(mut self) -> Self {
        self.dispatch = Dispatch::Override;
        self
    }

    /// Set visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as private
    pub fn private(self) -> Self {
        self.with_visibility(Visibility::Private)
    }

    /// Mark as protected
    pub fn protected(self) -> Self {
        self.with_visibility(Visibility::Protected)
    }

    /// Set the implementation
    pub fn body<F>(mut self, f: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.body = Some(native::method(f));
        self
    }
}

/// Implementation of a property accessor
#[derive(Clone)]
pub enum AccessorBody {
    /// Reads or writes the property's backing field
    Generated,
    /// Custom implementation
    Native(NativeMethod),
    /// No implementation (interfaces and abstract types)
    Abstract,
}

/// Definition for one property accessor
#[derive(Clone)]
pub struct AccessorDefinition {
    /// Accessor visibility
    pub visibility: Visibility,
    /// Accessor implementation
    pub body: AccessorBody,
}

impl AccessorDefinition {
    fn public(body: AccessorBody) -> Self {
        Self {
            visibility: Visibility::Public,
            body,
        }
    }
}

/// Storage behind generated accessors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyBacking {
    /// No storage; accessors must be native or abstract
    None,
    /// A hidden field created for the property
    Auto,
    /// A field declared on the same type or a base
    Field(String),
}

/// Definition for a property
#[derive(Clone)]
pub struct PropertyDefinition {
    /// Property name
    pub name: String,
    /// Property type
    pub property_type: TypeHandle,
    /// Whether the property is static
    pub is_static: bool,
    /// Dispatch mode of both accessors
    pub dispatch: Dispatch,
    /// Storage used by generated accessors
    pub backing: PropertyBacking,
    /// Get accessor
    pub getter: Option<AccessorDefinition>,
    /// Set accessor
    pub setter: Option<AccessorDefinition>,
    /// Index parameters
    pub index_parameters: Vec<ParameterDefinition>,
}

impl PropertyDefinition {
    /// A property without accessors; add them with `getter`/`setter`
    pub fn new(name: impl Into<String>, property_type: TypeHandle) -> Self {
        Self {
            name: name.into(),
            property_type,
            is_static: false,
            dispatch: Dispatch::Direct,
            backing: PropertyBacking::None,
            getter: None,
            setter: None,
            index_parameters: Vec::new(),
        }
    }

    /// A public get/set property stored in a hidden field
    ///
    /// Declared on an interface, both accessors are abstract.
    pub fn auto(name: impl Into<String>, property_type: TypeHandle) -> Self {
        Self {
            backing: PropertyBacking::Auto,
            getter: Some(AccessorDefinition::public(AccessorBody::Generated)),
            setter: Some(AccessorDefinition::public(AccessorBody::Generated)),
            ..Self::new(name, property_type)
        }
    }

    /// A public get/set property stored in an existing field
    pub fn backed_by(
        name: impl Into<String>,
        property_type: TypeHandle,
        field: impl Into<String>,
    ) -> Self {
        Self {
            backing: PropertyBacking::Field(field.into()),
            getter: Some(AccessorDefinition::public(AccessorBody::Generated)),
            setter: Some(AccessorDefinition::public(AccessorBody::Generated)),
            ..Self::new(name, property_type)
        }
    }

    /// Set a native get accessor
    pub fn getter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        self.getter = Some(AccessorDefinition::public(AccessorBody::Native(native::method(f))));
        self
    }

    /// Set a native set accessor; the new value is the last argument
    pub fn setter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<(), RuntimeError> + Send + Sync + 'static,
    {
        let body = native::method(move |inv| f(inv).map(|()| Value::Null));
        self.setter = Some(AccessorDefinition::public(AccessorBody::Native(body)));
        self
    }

    /// Declare an abstract get accessor
    pub fn abstract_getter(mut self) -> Self {
        self.getter = Some(AccessorDefinition::public(AccessorBody::Abstract));
        self
    }

    /// Declare an abstract set accessor
    pub fn abstract_setter(mut self) -> Self {
        self.setter = Some(AccessorDefinition::public(AccessorBody::Abstract));
        self
    }

    /// Change the get accessor's visibility
    pub fn getter_visibility(mut self, visibility: Visibility) -> Self {
        if let Some(getter) = self.getter.as_mut() {
            getter.visibility = visibility;
        }
        self
    }

    /// Change the set accessor's visibility
    pub fn setter_visibility(mut self, visibility: Visibility) -> Self {
        if let Some(setter) = self.setter.as_mut() {
            setter.visibility = visibility;
        }
        self
    }

    /// Remove the get accessor
    pub fn without_getter(mut self) -> Self {
        self.getter = None;
        self
    }

    /// Remove the set accessor
    pub fn without_setter(mut self) -> Self {
        self.setter = None;
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Make both accessors virtual
    pub fn as_virtual(mut self) -> Self {
        self.dispatch = Dispatch::Virtual;
        self
    }

    /// Override inherited virtual accessors
    pub fn as_override(mut self) -> Self {
        self.dispatch = Dispatch::Override;
        self
    }

    /// Add an index parameter
    pub fn index_parameter(mut self, name: impl Into<String>, parameter_type: TypeHandle) -> Self {
        self.index_parameters.push(ParameterDefinition {
            name: name.into(),
            parameter_type,
        });
        self
    }
}

/// Definition for a constructor
#[derive(Clone, Default)]
pub struct ConstructorDefinition {
    /// Parameters
    pub parameters: Vec<ParameterDefinition>,
    /// Constructor visibility
    pub visibility: Visibility,
    /// Initializer, run on the zeroed instance
    pub body: Option<NativeConstructor>,
}

impl ConstructorDefinition {
    /// Create a new public parameterless constructor definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter
    pub fn param(mut self, name: impl Into<String>, parameter_type: TypeHandle) -> Self {
        self.parameters.push(ParameterDefinition {
            name: name.into(),
            parameter_type,
        });
        self
    }

    /// Set visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as private
    pub fn private(self) -> Self {
        self.with_visibility(Visibility::Private)
    }

    /// Set the initializer
    pub fn body<F>(mut self, f: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> Result<(), RuntimeError> + Send + Sync + 'static,
    {
        self.body = Some(native::constructor(f));
        self
    }
}

/// Definition for a class, struct or interface
#[derive(Clone)]
pub struct TypeDefinition {
    /// Type name, unique within a registry
    pub name: String,
    /// `Class`, `Struct` or `Interface`
    pub kind: TypeKind,
    /// Whether the type is abstract
    pub is_abstract: bool,
    /// Whether the type is sealed
    pub is_sealed: bool,
    /// Base class (`Object` if none)
    pub base: Option<TypeHandle>,
    /// Implemented interfaces; for interfaces, extended interfaces
    pub interfaces: Vec<TypeHandle>,
    /// Fields
    pub fields: Vec<FieldDefinition>,
    /// Properties
    pub properties: Vec<PropertyDefinition>,
    /// Methods
    pub methods: Vec<MethodDefinition>,
    /// Constructors; a class without any gets a public parameterless one
    pub constructors: Vec<ConstructorDefinition>,
}

impl TypeDefinition {
    fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_abstract: false,
            is_sealed: false,
            base: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Define a class
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    /// Define a struct
    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Struct)
    }

    /// Define an interface
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    /// Set base class
    pub fn extends(mut self, base: TypeHandle) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, interface: TypeHandle) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Mark as abstract
    pub fn as_abstract(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Mark as sealed
    pub fn sealed(mut self) -> Self {
        self.is_sealed = true;
        self
    }

    /// Add a field
    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a property
    pub fn property(mut self, property: PropertyDefinition) -> Self {
        self.properties.push(property);
        self
    }

    /// Add a method
    pub fn method(mut self, method: MethodDefinition) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a constructor
    pub fn constructor(mut self, constructor: ConstructorDefinition) -> Self {
        self.constructors.push(constructor);
        self
    }
}
