//! Class descriptors
//!
//! Rust has no runtime reflection, so every type taking part in injection
//! publishes a [`Class`]: its name and namespace, its ancestor, the contracts
//! it implements, the fields carrying injection markers and the methods
//! marked as initialization hooks. Descriptors are built once, usually into a
//! `Lazy` static returned from [`Injectable::class`](crate::Injectable::class).
//!
//! Class references are plain function pointers ([`ClassRef`]) so that two
//! types can point at each other without forcing either descriptor to be
//! built first.
//!
//! # Example
//!
//! ```rust,ignore
//! impl Injectable for UserDao {
//!     fn class() -> &'static Class {
//!         static CLASS: Lazy<Class> = Lazy::new(|| {
//!             Class::concrete::<UserDao>("UserDao", module_path!())
//!                 .constructor(Constructor::public(|| Ok(Arc::new(UserDao::default()) as Instance)))
//!                 .implements(<dyn IUserDao as Injectable>::class)
//!                 .upcast(upcast!(UserDao => dyn IUserDao))
//!                 .field(Field::new::<Context<Session>>("em", |o| {
//!                     o.downcast_ref::<UserDao>().map(|d| &d.em as &dyn Slot)
//!                 }).context())
//!                 .build()
//!         });
//!         &CLASS
//!     }
//! }
//! ```

use crate::error::BoxError;
use crate::slot::{Instance, Slot};
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Lazily resolved reference to a class descriptor
pub type ClassRef = fn() -> &'static Class;

/// Projects a field slot out of an instance of the owning class
pub type SlotAccessor = fn(&dyn Any) -> Option<&dyn Slot>;

/// Projects the embedded ancestor part out of an instance
pub type ViewFn = fn(&dyn Any) -> Option<&dyn Any>;

/// Invokes a method on an instance of the owning class
pub type HookFn = fn(&dyn Any) -> Result<(), BoxError>;

/// Creates a new instance through a no-argument constructor
pub type CreateFn = fn() -> Result<Instance, BoxError>;

/// Turns an erased instance into a boxed `Arc<T>` for some target `T`
pub type ConvertFn = fn(&Instance) -> Option<Box<dyn Any + Send + Sync>>;

/// What kind of type a descriptor stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// An instantiable struct
    Concrete,
    /// An abstract capability, usually a `dyn Trait`
    Contract {
        /// Whether a test double may replace implementations of this contract
        substitutable: bool,
    },
}

/// Visibility of a type or of its constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Restricted,
}

/// Where a type is declared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nesting {
    #[default]
    TopLevel,
    /// Declared inside another type
    Member {
        outer: &'static str,
        /// Member types must not capture their enclosing instance
        is_static: bool,
    },
}

/// Link to the ancestor class whose fields are embedded in this one
#[derive(Clone, Copy)]
pub struct Superclass {
    class: ClassRef,
    view: ViewFn,
}

impl Superclass {
    /// The ancestor descriptor
    #[inline]
    pub fn class(&self) -> &'static Class {
        (self.class)()
    }

    /// Borrow the ancestor part of `target`
    #[inline]
    pub fn view<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.view)(target)
    }
}

/// A way to view an erased instance as `Arc<T>`
#[derive(Clone, Copy)]
pub struct Conversion {
    target: TypeId,
    target_name: &'static str,
    convert: ConvertFn,
}

impl Conversion {
    /// A conversion producing `Arc<T>`; used by [`upcast!`](crate::upcast)
    #[inline]
    pub fn new<T: ?Sized + 'static>(convert: ConvertFn) -> Self {
        Self {
            target: TypeId::of::<Arc<T>>(),
            target_name: std::any::type_name::<T>(),
            convert,
        }
    }

    /// The conversion of an instance to its own concrete type
    #[inline]
    pub fn identity<T: Any + Send + Sync>() -> Self {
        Self::new::<T>(|instance| {
            Arc::clone(instance)
                .downcast::<T>()
                .ok()
                .map(|arc| Box::new(arc) as Box<dyn Any + Send + Sync>)
        })
    }

    /// Whether this conversion produces `Arc<T>`
    #[inline]
    pub fn produces<T: ?Sized + 'static>(&self) -> bool {
        self.target == TypeId::of::<Arc<T>>()
    }

    pub fn target_name(&self) -> &'static str {
        self.target_name
    }

    #[inline]
    pub(crate) fn apply(&self, instance: &Instance) -> Option<Box<dyn Any + Send + Sync>> {
        (self.convert)(instance)
    }
}

/// A no-argument constructor
#[derive(Clone, Copy)]
pub struct Constructor {
    visibility: Visibility,
    create: CreateFn,
}

impl Constructor {
    /// A public constructor
    pub fn public(create: CreateFn) -> Self {
        Self {
            visibility: Visibility::Public,
            create,
        }
    }

    /// A constructor the injector is not allowed to call
    pub fn restricted(create: CreateFn) -> Self {
        Self {
            visibility: Visibility::Restricted,
            create,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    #[inline]
    pub(crate) fn create(&self) -> Result<Instance, BoxError> {
        (self.create)()
    }
}

/// Declared type of a field
#[derive(Clone, Copy)]
pub enum FieldType {
    /// A concrete type or a contract
    Class(ClassRef),
    /// A shared context handle of the named Rust type
    Context(&'static str),
}

/// Injection markers carried by a field
#[derive(Clone, Default)]
pub struct Markers {
    service: bool,
    fixture: bool,
    context: bool,
    substitutes: Vec<ClassRef>,
}

/// A field declared on a class
#[derive(Clone)]
pub struct Field {
    name: &'static str,
    declared: FieldType,
    markers: Markers,
    access: SlotAccessor,
}

impl Field {
    /// Describe a field whose slot type is `S`.
    ///
    /// The accessor must return the slot of exactly this field for an
    /// instance of the owning class, and `None` for anything else.
    pub fn new<S: Slot>(name: &'static str, access: SlotAccessor) -> Self {
        Self {
            name,
            declared: S::declared_type(),
            markers: Markers::default(),
            access,
        }
    }

    /// Mark as a shared service component
    pub fn service(mut self) -> Self {
        self.markers.service = true;
        self
    }

    /// Mark as a nested fixture injection point
    pub fn fixture(mut self) -> Self {
        self.markers.fixture = true;
        self
    }

    /// Mark as a receiver of the shared context value
    pub fn context(mut self) -> Self {
        self.markers.context = true;
        self
    }

    /// Register `substitute` for its contract when this field is visited
    pub fn use_substitute(mut self, substitute: ClassRef) -> Self {
        self.markers.substitutes.push(substitute);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn declared_type(&self) -> FieldType {
        self.declared
    }

    /// The declared class, if the field holds an object
    pub fn declared_class(&self) -> Option<&'static Class> {
        match self.declared {
            FieldType::Class(class) => Some(class()),
            FieldType::Context(_) => None,
        }
    }

    pub fn is_service(&self) -> bool {
        self.markers.service
    }

    pub fn is_fixture(&self) -> bool {
        self.markers.fixture
    }

    pub fn is_context(&self) -> bool {
        self.markers.context
    }

    /// Substitute classes listed on this field
    pub fn substitutes(&self) -> impl Iterator<Item = &'static Class> + '_ {
        self.markers.substitutes.iter().map(|class| class())
    }

    /// Borrow this field's slot on `target`
    #[inline]
    pub fn slot<'a>(&self, target: &'a dyn Any) -> Option<&'a dyn Slot> {
        (self.access)(target)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("service", &self.markers.service)
            .field("fixture", &self.markers.fixture)
            .field("context", &self.markers.context)
            .field("substitutes", &self.markers.substitutes.len())
            .finish()
    }
}

/// A method declared on a class
#[derive(Clone, Copy)]
pub struct Method {
    name: &'static str,
    arity: usize,
    init_hook: bool,
    invoke: HookFn,
}

impl Method {
    /// Describe a method taking `arity` arguments besides the receiver
    pub fn new(name: &'static str, arity: usize, invoke: HookFn) -> Self {
        Self {
            name,
            arity,
            init_hook: false,
            invoke,
        }
    }

    /// Mark as an initialization hook
    pub fn init_hook(mut self) -> Self {
        self.init_hook = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn is_init_hook(&self) -> bool {
        self.init_hook
    }

    #[inline]
    pub(crate) fn invoke(&self, target: &dyn Any) -> Result<(), BoxError> {
        (self.invoke)(target)
    }
}

/// Descriptor of a type taking part in injection.
///
/// Two descriptors are equal when they describe the same Rust type.
pub struct Class {
    id: TypeId,
    name: &'static str,
    namespace: &'static str,
    kind: Kind,
    visibility: Visibility,
    nesting: Nesting,
    superclass: Option<Superclass>,
    contracts: Vec<ClassRef>,
    conversions: Vec<Conversion>,
    fields: Vec<Field>,
    methods: Vec<Method>,
    constructor: Option<Constructor>,
    context_name: Option<&'static str>,
}

impl Class {
    /// Start describing the concrete type `T`
    pub fn concrete<T: Any + Send + Sync>(
        name: &'static str,
        namespace: &'static str,
    ) -> ClassBuilder {
        let mut builder = ClassBuilder::new(TypeId::of::<T>(), name, namespace, Kind::Concrete);
        builder.class.conversions.push(Conversion::identity::<T>());
        builder
    }

    /// Start describing the contract `T`, usually `dyn Trait`
    pub fn contract<T: ?Sized + 'static>(
        name: &'static str,
        namespace: &'static str,
    ) -> ClassBuilder {
        ClassBuilder::new(
            TypeId::of::<T>(),
            name,
            namespace,
            Kind::Contract {
                substitutable: false,
            },
        )
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Simple name, without namespace
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// `namespace::Name`, or `namespace::Outer::Name` for member types
    pub fn qualified_name(&self) -> String {
        self.sibling(self.name)
    }

    /// Qualified name of a type called `name` declared next to this one
    pub fn sibling(&self, name: &str) -> String {
        match self.nesting {
            Nesting::TopLevel => format!("{}::{}", self.namespace, name),
            Nesting::Member { outer, .. } => format!("{}::{}::{}", self.namespace, outer, name),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn is_contract(&self) -> bool {
        matches!(self.kind, Kind::Contract { .. })
    }

    pub fn is_substitutable(&self) -> bool {
        matches!(self.kind, Kind::Contract { substitutable: true })
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn nesting(&self) -> Nesting {
        self.nesting
    }

    pub fn superclass(&self) -> Option<&Superclass> {
        self.superclass.as_ref()
    }

    /// Contracts implemented directly by this class
    pub fn contracts(&self) -> impl Iterator<Item = &'static Class> + '_ {
        self.contracts.iter().map(|contract| contract())
    }

    pub fn conversions(&self) -> &[Conversion] {
        &self.conversions
    }

    /// Fields declared by this class, not its ancestors
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Methods declared by this class, not its ancestors
    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn constructor(&self) -> Option<&Constructor> {
        self.constructor.as_ref()
    }

    /// Name of the shared context this class wants, if not the default one
    pub fn context_name(&self) -> Option<&'static str> {
        self.context_name
    }

    /// The ancestor chain, starting with this class
    pub fn lineage(&'static self) -> impl Iterator<Item = &'static Class> {
        std::iter::successors(Some(self), |class| {
            class.superclass().map(|superclass| superclass.class())
        })
    }

    /// The first contract marked substitutable, looking at this class and
    /// then up the superclass chain.
    pub fn substitutable_contract(&'static self) -> Option<&'static Class> {
        self.lineage()
            .flat_map(|class| class.contracts())
            .find(|contract| contract.is_substitutable())
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Class {}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.qualified_name())
            .field("kind", &self.kind)
            .field("visibility", &self.visibility)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .finish()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// Builder for [`Class`]
pub struct ClassBuilder {
    class: Class,
}

impl ClassBuilder {
    fn new(id: TypeId, name: &'static str, namespace: &'static str, kind: Kind) -> Self {
        Self {
            class: Class {
                id,
                name,
                namespace,
                kind,
                visibility: Visibility::Public,
                nesting: Nesting::TopLevel,
                superclass: None,
                contracts: Vec::new(),
                conversions: Vec::new(),
                fields: Vec::new(),
                methods: Vec::new(),
                constructor: None,
                context_name: None,
            },
        }
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.class.visibility = visibility;
        self
    }

    /// Declare as a member of `outer`
    pub fn nested_in(mut self, outer: &'static str, is_static: bool) -> Self {
        self.class.nesting = Nesting::Member { outer, is_static };
        self
    }

    /// Mark a contract as replaceable by test doubles; no effect on concrete types
    pub fn substitutable(mut self, substitutable: bool) -> Self {
        if let Kind::Contract { .. } = self.class.kind {
            self.class.kind = Kind::Contract { substitutable };
        }
        self
    }

    /// Embed the fields of `superclass`, reachable through `view`
    pub fn extends(mut self, superclass: ClassRef, view: ViewFn) -> Self {
        self.class.superclass = Some(Superclass {
            class: superclass,
            view,
        });
        self
    }

    pub fn implements(mut self, contract: ClassRef) -> Self {
        self.class.contracts.push(contract);
        self
    }

    pub fn upcast(mut self, conversion: Conversion) -> Self {
        self.class.conversions.push(conversion);
        self
    }

    pub fn constructor(mut self, constructor: Constructor) -> Self {
        self.class.constructor = Some(constructor);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.class.fields.push(field);
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.class.methods.push(method);
        self
    }

    /// Shorthand for a zero-argument initialization hook
    pub fn init_hook(self, name: &'static str, invoke: HookFn) -> Self {
        self.method(Method::new(name, 0, invoke).init_hook())
    }

    pub fn context_name(mut self, name: &'static str) -> Self {
        self.class.context_name = Some(name);
        self
    }

    pub fn build(self) -> Class {
        self.class
    }
}
