use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A thread-safe, reference-counted handle to shared engine state.
///
/// `MtResource` wraps an `Arc<RwLock<T>>`. The chunk store, every resident
/// column and the pending edit buffer are all shared this way between the
/// frame thread and the background streaming thread. Cloning the handle is
/// cheap and never copies the contained value.
///
/// # Examples
///
/// ```
/// use voxel_streamer::core::MtResource;
///
/// let counter = MtResource::new(0);
/// let counter_clone = counter.clone();
///
/// std::thread::spawn(move || {
///     *counter_clone.get_mut() += 1;
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(*counter.get(), 1);
/// ```
///
/// # Locking discipline
/// - Read guards (`get()`) can be held concurrently
/// - Write guards (`get_mut()`) are exclusive
/// - Never hold a guard on the chunk store while waiting on a column guard
///   from inside a column guard; the store is always locked first and only
///   briefly
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync + 'static> MtResource<T> {
    /// Creates a new `MtResource` containing the given value.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Returns a read-only guard on the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned, which only happens after another
    /// thread already panicked while holding the write guard.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource
            .read()
            .expect("MtResource lock poisoned by a panicking writer")
    }

    /// Returns an exclusive guard on the contained value.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource
            .write()
            .expect("MtResource lock poisoned by a panicking writer")
    }

    /// Returns `true` if both handles point at the same shared value.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.resource, &other.resource)
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}

impl<T: Default + Send + Sync + 'static> Default for MtResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_value() {
        let resource = MtResource::new(vec![1, 2, 3]);
        let other = resource.clone();

        other.get_mut().push(4);

        assert_eq!(resource.get().len(), 4);
        assert!(resource.ptr_eq(&other));
        assert!(!resource.ptr_eq(&MtResource::new(vec![1, 2, 3, 4])));
    }
}
