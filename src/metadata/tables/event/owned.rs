use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Weak,
};

use parking_lot::RwLock;

use crate::{
    metadata::{
        entity::Origin,
        loader::LoaderContext,
        ownership::{reassign, OwnershipEdge},
        provider::Relation,
        streams::Name,
        tables::{
            AccessorList, CustomAttributeList, EventList, EventRc, MethodDefRc, TableId, TypeDef,
            TypeDefOrRef, TypeDefRc,
        },
        token::Token,
    },
    utils::{EntityLock, InitPolicy, LazySlot},
    Error, Result,
};

/// The accessor methods of an event, by role
#[derive(Clone, Debug, Default)]
pub struct EventAccessors {
    /// The `add_` method
    pub add: Option<MethodDefRc>,
    /// The `remove_` method
    pub remove: Option<MethodDefRc>,
    /// The `raise_` method
    pub fire: Option<MethodDefRc>,
    /// Methods bound with the `Other` role
    pub others: AccessorList,
}

/// An event declared by a type
pub struct Event {
    this: Weak<Event>,
    rid: AtomicU32,
    origin: Origin,
    sync: EntityLock,
    flags: AtomicU32,
    name: RwLock<Name>,
    event_type: LazySlot<Option<TypeDefOrRef>>,
    declaring_type: LazySlot<Option<Weak<TypeDef>>>,
    accessors: LazySlot<EventAccessors>,
    custom_attributes: LazySlot<CustomAttributeList>,
}

impl_metadata_entity!(Event, Event);

impl Event {
    /// Create an event in memory, without accessors
    #[must_use]
    pub fn new(name: impl Into<Name>, flags: u32, event_type: Option<TypeDefOrRef>) -> EventRc {
        Arc::new_cyclic(|this| Event {
            this: this.clone(),
            rid: AtomicU32::new(0),
            origin: Origin::InMemory,
            sync: EntityLock::new(InitPolicy::default()),
            flags: AtomicU32::new(flags),
            name: RwLock::new(name.into()),
            event_type: LazySlot::with_value(event_type),
            declaring_type: LazySlot::with_value(None),
            accessors: LazySlot::with_value(EventAccessors::default()),
            custom_attributes: LazySlot::with_value(Arc::new(boxcar::Vec::new())),
        })
    }

    pub(crate) fn materialized(ctx: &LoaderContext, rid: u32, flags: u32, name: Name) -> EventRc {
        Arc::new_cyclic(|this| Event {
            this: this.clone(),
            rid: AtomicU32::new(rid),
            origin: ctx.origin(rid),
            sync: ctx.lock(),
            flags: AtomicU32::new(flags),
            name: RwLock::new(name),
            event_type: LazySlot::new(),
            declaring_type: LazySlot::new(),
            accessors: LazySlot::new(),
            custom_attributes: LazySlot::new(),
        })
    }

    fn load<T>(&self, compute: impl FnOnce(&LoaderContext, u32) -> T) -> Option<T> {
        let (rid, ctx) = self.origin.reader()?;
        Some(compute(&ctx, rid))
    }

    /// `EventAttributes` bitmask
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Acquire)
    }

    /// Replace the flags
    pub fn set_flags(&self, flags: u32) {
        self.flags.store(flags, Ordering::Release);
    }

    /// The event name
    pub fn name(&self) -> Name {
        self.name.read().clone()
    }

    /// Rename the event
    pub fn set_name(&self, name: impl Into<Name>) {
        *self.name.write() = name.into();
    }

    /// The delegate type of the event
    pub fn event_type(&self) -> Option<TypeDefOrRef> {
        self.event_type
            .get(&self.sync, || self.load(|ctx, rid| ctx.event_type(rid)).flatten())
    }

    /// Replace the delegate type
    pub fn set_event_type(&self, event_type: Option<TypeDefOrRef>) {
        self.event_type.set(&self.sync, event_type);
    }

    /// The declaring type
    pub fn declaring_type(&self) -> Option<TypeDefRc> {
        self.declaring_type
            .get_relaxed(|| {
                self.load(|ctx, rid| {
                    ctx.member_declaring_type(Relation::Events, Token::from_parts(TableId::Event, rid))
                })
                .flatten()
            })
            .and_then(|owner| owner.upgrade())
    }

    /// Move this event to `owner`, or detach it with `None`
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the event is being dropped.
    pub fn set_declaring_type(&self, owner: Option<&TypeDefRc>) -> Result<()> {
        let this = self
            .this
            .upgrade()
            .ok_or_else(|| Error::InvalidOperation("the event is being dropped".to_string()))?;
        reassign::<DeclaredEvents>(&this, owner)
    }

    /// All accessors, loaded together
    pub fn accessors(&self) -> EventAccessors {
        self.accessors.get(&self.sync, || {
            self.load(|ctx, rid| ctx.event_accessors(rid))
                .unwrap_or_default()
        })
    }

    /// Replace the accessors
    pub fn set_accessors(&self, accessors: EventAccessors) {
        self.accessors.set(&self.sync, accessors);
    }

    /// Custom attributes applied to this event
    pub fn custom_attributes(&self) -> CustomAttributeList {
        self.custom_attributes.get(&self.sync, || {
            self.load(|ctx, rid| ctx.custom_attributes(Token::from_parts(TableId::Event, rid)))
                .unwrap_or_else(|| Arc::new(boxcar::Vec::new()))
        })
    }

    /// Force every lazy property
    pub fn initialize(&self) {
        let _ = self.event_type();
        let _ = self.declaring_type();
        let _ = self.accessors();
        let _ = self.custom_attributes();
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("rid", &self.rid.load(Ordering::Relaxed))
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Events declared by a type
pub struct DeclaredEvents;

impl OwnershipEdge for DeclaredEvents {
    type Child = Event;
    type Owner = TypeDefRc;
    type WeakOwner = Weak<TypeDef>;

    const CHILD_KIND: &'static str = "event";

    fn downgrade(owner: &Self::Owner) -> Self::WeakOwner {
        Arc::downgrade(owner)
    }

    fn upgrade(owner: &Self::WeakOwner) -> Option<Self::Owner> {
        owner.upgrade()
    }

    fn same_owner(a: &Self::Owner, b: &Self::Owner) -> bool {
        Arc::ptr_eq(a, b)
    }

    fn owner_of(child: &Self::Child) -> Option<Self::Owner> {
        child.declaring_type()
    }

    fn set_owner(child: &Self::Child, owner: Option<&Self::Owner>) {
        child.declaring_type.set_relaxed(owner.map(Arc::downgrade));
    }

    fn list(owner: &Self::Owner) -> EventList {
        owner.events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::tables::MethodDef;

    #[test]
    fn accessors_round_out_the_event() {
        let handler = TypeDef::new("System", "EventHandler", 0);
        let event = Event::new("Changed", 0, Some(TypeDefOrRef::TypeDef(handler.clone())));
        assert_eq!(event.event_type().unwrap().full_name(), "System.EventHandler");
        assert!(event.accessors().add.is_none());

        let add = MethodDef::new("add_Changed", 0x0800, None);
        event.set_accessors(EventAccessors {
            add: Some(add.clone()),
            ..Default::default()
        });
        assert!(Arc::ptr_eq(&event.accessors().add.unwrap(), &add));
    }

    #[test]
    fn owned_by_declaring_type() {
        let ty = TypeDef::new("Demo", "Widget", 0);
        let event = Event::new("Changed", 0, None);
        ty.events().add(event.clone()).unwrap();
        assert!(Arc::ptr_eq(&event.declaring_type().unwrap(), &ty));
        assert!(Arc::ptr_eq(&ty.find_event("Changed").unwrap(), &event));
    }
}
