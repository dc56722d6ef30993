//! # IDs
//!
//! Layers, groups, paths, and documents are addressed by process-unique IDs,
//! implemented by the `PeelID<T>` type and namespaced by the type `T`. A host
//! binding hands these out when it snapshots a document and resolves them back
//! to its own objects on every call, so no host handle ever leaks into the
//! model. Order of IDs is not guaranteed.

// Next available ID per namespace. A RwLock'd map from TypeId to the counter
// for that namespace.
static ID_SERVER: parking_lot::RwLock<
    std::collections::BTreeMap<std::any::TypeId, std::sync::atomic::AtomicU64>,
> = parking_lot::const_rwlock(std::collections::BTreeMap::new());

/// ID guaranteed unique within this execution of the program.
/// IDs with different namespaces may share a value but are distinct types.
pub struct PeelID<T: std::any::Any> {
    id: std::num::NonZeroU64,
    // Namespace marker
    _phantom: std::marker::PhantomData<T>,
}
impl<T: std::any::Any> Clone for PeelID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: std::any::Any> Copy for PeelID<T> {}
impl<T: std::any::Any> std::cmp::PartialEq for PeelID<T> {
    fn eq(&self, other: &Self) -> bool {
        // Namespaces already agree at compile time.
        self.id == other.id
    }
}
impl<T: std::any::Any> std::cmp::Eq for PeelID<T> {}

// Safety - the ID is only ever a u64. A !Send or !Sync T would otherwise
// infect the ID even though no T is stored.
unsafe impl<T: std::any::Any> Send for PeelID<T> {}
unsafe impl<T: std::any::Any> Sync for PeelID<T> {}

impl<T: std::any::Any> std::hash::Hash for PeelID<T> {
    /// Relies on the internal representation of `TypeId`, which is unstable
    /// between compilations. Do not persist or compare hashes across runs.
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::any::TypeId::of::<T>().hash(state);
        self.id.hash(state);
    }
}

impl<T: std::any::Any> PeelID<T> {
    /// Get the raw numeric value of this ID.
    /// IDs from differing namespaces may share the same numeric ID!
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id.get()
    }
    /// Allocate a fresh ID in this namespace.
    ///
    /// Exhausting all `u64::MAX - 1` IDs panics - unreachable by one-at-a-time
    /// allocation in any realistic run.
    #[must_use]
    pub fn next() -> Self {
        let raw = {
            let read = ID_SERVER.upgradable_read();
            let ty = std::any::TypeId::of::<T>();
            if let Some(atomic) = read.get(&ty) {
                // Uniqueness is all that matters, not order.
                atomic.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            } else {
                // First allocation in this namespace - take exclusive access.
                // Happens once per namespace for the program's whole life.
                let mut write = parking_lot::RwLockUpgradableReadGuard::upgrade(read);
                write.insert(ty, 2.into());
                1
            }
        };

        Self {
            // Counters start at 1 and a u64 cannot be exhausted one
            // increment at a time.
            id: std::num::NonZeroU64::new(raw)
                .unwrap_or_else(|| panic!("{} ID overflow", std::any::type_name::<T>())),
            _phantom: std::marker::PhantomData,
        }
    }
}
impl<T: std::any::Any> Default for PeelID<T> {
    fn default() -> Self {
        Self::next()
    }
}
impl<T: std::any::Any> std::fmt::Display for PeelID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Unwrap here is safe - rsplit always yields at least one element.
        write!(
            f,
            "{}#{}",
            std::any::type_name::<T>().rsplit("::").next().unwrap(),
            self.id
        )
    }
}
impl<T: std::any::Any> std::fmt::Debug for PeelID<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <Self as std::fmt::Display>::fmt(self, f)
    }
}

#[cfg(test)]
mod test {
    use super::PeelID;
    // Tests share global state with the whole process, so each gets its own
    // namespace type.

    #[test]
    fn sequential_unique() {
        struct Namespace;
        type TestID = PeelID<Namespace>;

        let mut v: Vec<_> = (0..1024).map(|_| TestID::next()).collect();
        v.sort_unstable_by_key(TestID::id);
        let before = v.len();
        v.dedup();
        assert_eq!(before, v.len(), "had duplicate ids");
    }

    #[test]
    fn namespaces_are_independent() {
        struct Left;
        struct Right;

        // Whatever Left has allocated, Right starts over at 1.
        let _ = PeelID::<Left>::next();
        let _ = PeelID::<Left>::next();
        let first_right = PeelID::<Right>::next();
        assert_eq!(first_right.id(), 1);
    }
}
