//! Hand-written descriptors shared by the integration tests.
//!
//! The graph mirrors a small persistence layer:
//!
//! - `IFirstDao` -> `FirstDao`, with a context slot and a `IThirdDao` service
//! - `IThirdDao` -> `ThirdDao`, extending `AbstractDao` (which references
//!   `IFirstDao`, closing a service cycle) and holding a `SecondDao`
//! - `MockThirdDao`, a substitute for the substitutable `IThirdDao`
//! - generators nesting other generators as fixtures

#![allow(dead_code)]

use fixture_injector::{
    BoxError, Class, Constructor, Context, Field, Inject, Injectable, Injector, Instance, Lazy,
    Slot, Visibility,
};
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Describe the field `$name` of `$owner`, holding a `$slot`
macro_rules! field {
    ($owner:ty, $name:ident: $slot:ty) => {
        Field::new::<$slot>(stringify!($name), |o| {
            o.downcast_ref::<$owner>().map(|s| &s.$name as &dyn Slot)
        })
    };
}

fn create<T: Default + Any + Send + Sync>() -> Result<Instance, BoxError> {
    Ok(Arc::new(T::default()) as Instance)
}

/// Stand-in for a persistence session
#[derive(Debug, PartialEq, Eq)]
pub struct Session {
    pub name: &'static str,
}

impl Session {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self { name })
    }
}

// ---------------------------------------------------------------------------
// Contracts
// ---------------------------------------------------------------------------

pub trait FirstDao: Send + Sync {
    fn session(&self) -> Option<&Arc<Session>>;
    fn third(&self) -> Option<&Arc<dyn ThirdDao>>;
    fn starts(&self) -> usize;
}
fixture_injector::contract!(dyn FirstDao as "IFirstDao");

pub trait ThirdDao: Send + Sync {
    fn describe(&self) -> &'static str;
    fn first(&self) -> Option<&Arc<dyn FirstDao>>;
    fn session(&self) -> Option<&Arc<Session>>;
    fn opened(&self) -> usize;
}
fixture_injector::contract!(dyn ThirdDao as "IThirdDao", substitutable);

pub trait Ghost: Send + Sync {}
fixture_injector::contract!(dyn Ghost as "IGhost");

pub trait Locked: Send + Sync {}
fixture_injector::contract!(dyn Locked as "ILocked");

/// Resolves to `StoreImpl` by suffix
pub trait Reader: Send + Sync {}
fixture_injector::contract!(dyn Reader as "Store");

/// Resolves to `StoreImpl` by marker
pub trait Writer: Send + Sync {}
fixture_injector::contract!(dyn Writer as "IStoreImpl");

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FirstDaoBean {
    pub em: Context<Session>,
    pub third: Inject<dyn ThirdDao>,
    pub starts: AtomicUsize,
}

impl FirstDao for FirstDaoBean {
    fn session(&self) -> Option<&Arc<Session>> {
        self.em.get()
    }

    fn third(&self) -> Option<&Arc<dyn ThirdDao>> {
        self.third.get()
    }

    fn starts(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }
}

impl Injectable for FirstDaoBean {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<FirstDaoBean>("FirstDao", module_path!())
                .constructor(Constructor::public(create::<FirstDaoBean>))
                .implements(<dyn FirstDao as Injectable>::class)
                .upcast(fixture_injector::upcast!(FirstDaoBean => dyn FirstDao))
                .field(field!(FirstDaoBean, em: Context<Session>).context())
                .field(field!(FirstDaoBean, third: Inject<dyn ThirdDao>).service())
                .init_hook("start", |o| {
                    let dao = o.downcast_ref::<FirstDaoBean>().ok_or("not a FirstDao")?;
                    dao.starts.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build()
        });
        &CLASS
    }
}

#[derive(Default)]
pub struct SecondDao {
    pub em: Context<Session>,
}

impl Injectable for SecondDao {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<SecondDao>("SecondDao", module_path!())
                .constructor(Constructor::public(create::<SecondDao>))
                .field(field!(SecondDao, em: Context<Session>).context())
                .build()
        });
        &CLASS
    }
}

/// Ancestor of `ThirdDaoBean`; never instantiated alone
#[derive(Default)]
pub struct AbstractDao {
    pub abstract_em: Context<Session>,
    pub first: Inject<dyn FirstDao>,
    pub opened: AtomicUsize,
}

impl Injectable for AbstractDao {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<AbstractDao>("AbstractDao", module_path!())
                .field(field!(AbstractDao, abstract_em: Context<Session>).context())
                .field(field!(AbstractDao, first: Inject<dyn FirstDao>).service())
                .init_hook("open", |o| {
                    let dao = o.downcast_ref::<AbstractDao>().ok_or("not an AbstractDao")?;
                    dao.opened.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build()
        });
        &CLASS
    }
}

#[derive(Default)]
pub struct ThirdDaoBean {
    pub base: AbstractDao,
    pub second: Inject<SecondDao>,
}

impl ThirdDao for ThirdDaoBean {
    fn describe(&self) -> &'static str {
        "real"
    }

    fn first(&self) -> Option<&Arc<dyn FirstDao>> {
        self.base.first.get()
    }

    fn session(&self) -> Option<&Arc<Session>> {
        self.base.abstract_em.get()
    }

    fn opened(&self) -> usize {
        self.base.opened.load(Ordering::SeqCst)
    }
}

impl Injectable for ThirdDaoBean {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<ThirdDaoBean>("ThirdDao", module_path!())
                .constructor(Constructor::public(create::<ThirdDaoBean>))
                .extends(AbstractDao::class, |o| {
                    o.downcast_ref::<ThirdDaoBean>().map(|d| &d.base as &dyn Any)
                })
                .implements(<dyn ThirdDao as Injectable>::class)
                .upcast(fixture_injector::upcast!(ThirdDaoBean => dyn ThirdDao))
                .field(field!(ThirdDaoBean, second: Inject<SecondDao>).service())
                .build()
        });
        &CLASS
    }
}

/// Test double for `IThirdDao`, wired like a real component on first use
#[derive(Default)]
pub struct MockThirdDao {
    pub em: Context<Session>,
    pub prepared: AtomicUsize,
}

impl ThirdDao for MockThirdDao {
    fn describe(&self) -> &'static str {
        "mock"
    }

    fn first(&self) -> Option<&Arc<dyn FirstDao>> {
        None
    }

    fn session(&self) -> Option<&Arc<Session>> {
        self.em.get()
    }

    fn opened(&self) -> usize {
        self.prepared.load(Ordering::SeqCst)
    }
}

impl Injectable for MockThirdDao {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<MockThirdDao>("MockThirdDao", module_path!())
                .constructor(Constructor::public(create::<MockThirdDao>))
                .implements(<dyn ThirdDao as Injectable>::class)
                .upcast(fixture_injector::upcast!(MockThirdDao => dyn ThirdDao))
                .field(field!(MockThirdDao, em: Context<Session>).context())
                .init_hook("prepare", |o| {
                    let mock = o.downcast_ref::<MockThirdDao>().ok_or("not a MockThirdDao")?;
                    mock.prepared.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build()
        });
        &CLASS
    }
}

/// Implements only the non-substitutable `IFirstDao`
#[derive(Default)]
pub struct PlainFake;

impl Injectable for PlainFake {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<PlainFake>("PlainFake", module_path!())
                .constructor(Constructor::public(create::<PlainFake>))
                .implements(<dyn FirstDao as Injectable>::class)
                .build()
        });
        &CLASS
    }
}

#[derive(Default)]
pub struct LockedBean;

impl Locked for LockedBean {}

impl Injectable for LockedBean {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<LockedBean>("Locked", module_path!())
                .constructor(Constructor::restricted(create::<LockedBean>))
                .implements(<dyn Locked as Injectable>::class)
                .upcast(fixture_injector::upcast!(LockedBean => dyn Locked))
                .build()
        });
        &CLASS
    }
}

#[derive(Default)]
pub struct StoreImpl;

impl Reader for StoreImpl {}
impl Writer for StoreImpl {}

impl Injectable for StoreImpl {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<StoreImpl>("StoreImpl", module_path!())
                .constructor(Constructor::public(create::<StoreImpl>))
                .implements(<dyn Reader as Injectable>::class)
                .implements(<dyn Writer as Injectable>::class)
                .upcast(fixture_injector::upcast!(StoreImpl => dyn Reader))
                .upcast(fixture_injector::upcast!(StoreImpl => dyn Writer))
                .build()
        });
        &CLASS
    }
}

// ---------------------------------------------------------------------------
// Generators and finders
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct ItemGenerator {
    pub em: Context<Session>,
    pub hooked: AtomicUsize,
}

impl Injectable for ItemGenerator {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<ItemGenerator>("ItemGenerator", module_path!())
                .constructor(Constructor::public(create::<ItemGenerator>))
                .field(field!(ItemGenerator, em: Context<Session>).context())
                .init_hook("prepare", |o| {
                    let generator = o.downcast_ref::<ItemGenerator>().ok_or("not a generator")?;
                    generator.hooked.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .build()
        });
        &CLASS
    }
}

#[derive(Default)]
pub struct OrderGenerator {
    pub first: Inject<dyn FirstDao>,
    pub items: Inject<ItemGenerator>,
}

impl Injectable for OrderGenerator {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<OrderGenerator>("OrderGenerator", module_path!())
                .constructor(Constructor::public(create::<OrderGenerator>))
                .field(field!(OrderGenerator, first: Inject<dyn FirstDao>).service())
                .field(field!(OrderGenerator, items: Inject<ItemGenerator>).fixture())
                .build()
        });
        &CLASS
    }
}

/// Root generator exercising services, fixtures and the context together
#[derive(Default)]
pub struct UserGenerator {
    pub first: Inject<dyn FirstDao>,
    pub first_again: Inject<dyn FirstDao>,
    pub third: Inject<dyn ThirdDao>,
    pub orders: Inject<OrderGenerator>,
    pub archived_orders: Inject<OrderGenerator>,
    pub em: Context<Session>,
    pub plain: Inject<SecondDao>,
}

impl Injectable for UserGenerator {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<UserGenerator>("UserGenerator", module_path!())
                .constructor(Constructor::public(create::<UserGenerator>))
                .field(field!(UserGenerator, first: Inject<dyn FirstDao>).service())
                .field(field!(UserGenerator, first_again: Inject<dyn FirstDao>).service())
                .field(field!(UserGenerator, third: Inject<dyn ThirdDao>).service())
                .field(field!(UserGenerator, orders: Inject<OrderGenerator>).fixture())
                .field(field!(UserGenerator, archived_orders: Inject<OrderGenerator>).fixture())
                .field(field!(UserGenerator, em: Context<Session>).context())
                // described without any marker
                .field(field!(UserGenerator, plain: Inject<SecondDao>))
                .build()
        });
        &CLASS
    }
}

/// Root declaring a substitute for `IThirdDao`
#[derive(Default)]
pub struct MockedGenerator {
    pub first: Inject<dyn FirstDao>,
    pub third: Inject<dyn ThirdDao>,
}

impl Injectable for MockedGenerator {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<MockedGenerator>("MockedGenerator", module_path!())
                .field(field!(MockedGenerator, third: Inject<dyn ThirdDao>)
                    .service()
                    .use_substitute(MockThirdDao::class))
                .field(field!(MockedGenerator, first: Inject<dyn FirstDao>).service())
                .build()
        });
        &CLASS
    }
}

#[derive(Default)]
pub struct BadSubstituteGenerator {
    pub first: Inject<dyn FirstDao>,
}

impl Injectable for BadSubstituteGenerator {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<BadSubstituteGenerator>("BadSubstituteGenerator", module_path!())
                .field(field!(BadSubstituteGenerator, first: Inject<dyn FirstDao>)
                    .service()
                    .use_substitute(PlainFake::class))
                .build()
        });
        &CLASS
    }
}

/// Fixture nesting itself
#[derive(Default)]
pub struct RecursiveGenerator {
    pub inner: Inject<RecursiveGenerator>,
}

impl Injectable for RecursiveGenerator {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<RecursiveGenerator>("RecursiveGenerator", module_path!())
                .constructor(Constructor::public(create::<RecursiveGenerator>))
                .field(field!(RecursiveGenerator, inner: Inject<RecursiveGenerator>).fixture())
                .build()
        });
        &CLASS
    }
}

#[derive(Default)]
pub struct SelfGenerator {
    pub inner: Inject<RecursiveGenerator>,
}

impl Injectable for SelfGenerator {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<SelfGenerator>("SelfGenerator", module_path!())
                .field(field!(SelfGenerator, inner: Inject<RecursiveGenerator>).fixture())
                .build()
        });
        &CLASS
    }
}

/// Two services whose fixtures land on the same path, since services do
/// not extend the path
#[derive(Default)]
pub struct LeftHub {
    pub report: Inject<ItemGenerator>,
}

#[derive(Default)]
pub struct RightHub {
    pub report: Inject<ItemGenerator>,
}

impl Injectable for LeftHub {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<LeftHub>("LeftHub", module_path!())
                .constructor(Constructor::public(create::<LeftHub>))
                .field(field!(LeftHub, report: Inject<ItemGenerator>).fixture())
                .build()
        });
        &CLASS
    }
}

impl Injectable for RightHub {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<RightHub>("RightHub", module_path!())
                .constructor(Constructor::public(create::<RightHub>))
                .field(field!(RightHub, report: Inject<ItemGenerator>).fixture())
                .build()
        });
        &CLASS
    }
}

#[derive(Default)]
pub struct Report {
    pub left: Inject<LeftHub>,
    pub right: Inject<RightHub>,
}

impl Injectable for Report {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<Report>("Report", module_path!())
                .field(field!(Report, left: Inject<LeftHub>).service())
                .field(field!(Report, right: Inject<RightHub>).service())
                .build()
        });
        &CLASS
    }
}

#[derive(Default)]
pub struct Haunted {
    pub ghost: Inject<dyn Ghost>,
}

impl Injectable for Haunted {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<Haunted>("Haunted", module_path!())
                .field(field!(Haunted, ghost: Inject<dyn Ghost>).service())
                .build()
        });
        &CLASS
    }
}

#[derive(Default)]
pub struct Vault {
    pub locked: Inject<dyn Locked>,
}

impl Injectable for Vault {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<Vault>("Vault", module_path!())
                .visibility(Visibility::Public)
                .field(field!(Vault, locked: Inject<dyn Locked>).service())
                .build()
        });
        &CLASS
    }
}

#[derive(Default)]
pub struct Ledger {
    pub reader: Inject<dyn Reader>,
    pub writer: Inject<dyn Writer>,
}

impl Injectable for Ledger {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<Ledger>("Ledger", module_path!())
                .field(field!(Ledger, reader: Inject<dyn Reader>).service())
                .field(field!(Ledger, writer: Inject<dyn Writer>).service())
                .build()
        });
        &CLASS
    }
}

/// Finder bound to the `archive` context
#[derive(Default)]
pub struct ArchiveFinder {
    pub em: Context<Session>,
    pub second: Inject<SecondDao>,
}

impl Injectable for ArchiveFinder {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<ArchiveFinder>("ArchiveFinder", module_path!())
                .context_name("archive")
                .field(field!(ArchiveFinder, em: Context<Session>).context())
                .field(field!(ArchiveFinder, second: Inject<SecondDao>).service())
                .build()
        });
        &CLASS
    }
}

// ---------------------------------------------------------------------------
// Failing components
// ---------------------------------------------------------------------------

/// Service whose constructor fails
#[derive(Default)]
pub struct BrokenDao;

impl Injectable for BrokenDao {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<BrokenDao>("BrokenDao", module_path!())
                .constructor(Constructor::public(|| Err("database unreachable".into())))
                .build()
        });
        &CLASS
    }
}

/// Service whose initialization hook fails
#[derive(Default)]
pub struct FaultyDao;

impl Injectable for FaultyDao {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<FaultyDao>("FaultyDao", module_path!())
                .constructor(Constructor::public(create::<FaultyDao>))
                .init_hook("warm_up", |_| Err("cache warm-up failed".into()))
                .build()
        });
        &CLASS
    }
}

/// Generator whose service hook fails after a context slot and a fixture
/// were already wired
#[derive(Default)]
pub struct FailingGenerator {
    pub em: Context<Session>,
    pub items: Inject<ItemGenerator>,
    pub faulty: Inject<FaultyDao>,
}

impl Injectable for FailingGenerator {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<FailingGenerator>("FailingGenerator", module_path!())
                .field(field!(FailingGenerator, em: Context<Session>).context())
                .field(field!(FailingGenerator, items: Inject<ItemGenerator>).fixture())
                .field(field!(FailingGenerator, faulty: Inject<FaultyDao>).service())
                .build()
        });
        &CLASS
    }
}

/// Generator holding only the service with the failing constructor
#[derive(Default)]
pub struct BrokenGenerator {
    pub em: Context<Session>,
    pub broken: Inject<BrokenDao>,
}

impl Injectable for BrokenGenerator {
    fn class() -> &'static Class {
        static CLASS: Lazy<Class> = Lazy::new(|| {
            Class::concrete::<BrokenGenerator>("BrokenGenerator", module_path!())
                .field(field!(BrokenGenerator, em: Context<Session>).context())
                .field(field!(BrokenGenerator, broken: Inject<BrokenDao>).service())
                .build()
        });
        &CLASS
    }
}

/// Injector knowing every implementation above
pub fn injector() -> Injector {
    Injector::builder()
        .register::<FirstDaoBean>()
        .register::<SecondDao>()
        .register::<ThirdDaoBean>()
        .register::<MockThirdDao>()
        .register::<LockedBean>()
        .register::<StoreImpl>()
        .build()
}
