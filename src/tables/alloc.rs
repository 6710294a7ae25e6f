//! Fallible buffer allocation with an optional byte ceiling.
//!
//! Every load and every cache rebuild opens a [`Reservation`] from the
//! configured [`MemoryLimit`]. Buffers and duplicated class names are charged
//! against it, and any failure (ceiling exceeded or `try_reserve` refused) is
//! reported as [`SaberError::AllocationFailure`].

use crate::error::{Result, SaberError};

const F64_BYTES: usize = std::mem::size_of::<f64>();

/// Upper bound on the bytes a single load or rebuild may allocate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryLimit {
    max_bytes: Option<usize>,
}

impl MemoryLimit {
    pub fn unlimited() -> Self {
        Self { max_bytes: None }
    }

    pub fn bytes(max_bytes: usize) -> Self {
        Self {
            max_bytes: Some(max_bytes),
        }
    }

    pub fn max_bytes(&self) -> Option<usize> {
        self.max_bytes
    }

    pub(crate) fn reserve(&self) -> Reservation {
        Reservation {
            remaining: self.max_bytes,
        }
    }
}

/// Running byte budget for one operation.
#[derive(Debug)]
pub(crate) struct Reservation {
    remaining: Option<usize>,
}

impl Reservation {
    fn charge(&mut self, bytes: usize, context: &'static str) -> Result<()> {
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining
                .checked_sub(bytes)
                .ok_or(SaberError::AllocationFailure(context))?;
        }
        Ok(())
    }

    /// Owned copy of `src`.
    pub(crate) fn copy_values(&mut self, src: &[f64], context: &'static str) -> Result<Vec<f64>> {
        self.charge(src.len() * F64_BYTES, context)?;
        let mut values = Vec::new();
        values
            .try_reserve_exact(src.len())
            .map_err(|_| SaberError::AllocationFailure(context))?;
        values.extend_from_slice(src);
        Ok(values)
    }

    /// Owned copy of a class name.
    pub(crate) fn copy_name(&mut self, name: &str, context: &'static str) -> Result<String> {
        self.charge(name.len(), context)?;
        let mut owned = String::new();
        owned
            .try_reserve_exact(name.len())
            .map_err(|_| SaberError::AllocationFailure(context))?;
        owned.push_str(name);
        Ok(owned)
    }

    /// Resize `buffer` to `len` zeros, reusing its storage when possible.
    pub(crate) fn resize(
        &mut self,
        buffer: &mut Vec<f64>,
        len: usize,
        context: &'static str,
    ) -> Result<()> {
        self.charge(len * F64_BYTES, context)?;
        buffer.clear();
        buffer
            .try_reserve_exact(len)
            .map_err(|_| SaberError::AllocationFailure(context))?;
        buffer.resize(len, 0.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_reservation_copies() {
        let mut reservation = MemoryLimit::unlimited().reserve();
        let copy = reservation.copy_values(&[1.0, 2.0], "copying").unwrap();
        assert_eq!(copy, vec![1.0, 2.0]);
    }

    #[test]
    fn test_limit_is_shared_across_one_reservation() {
        // Room for exactly three doubles
        let mut reservation = MemoryLimit::bytes(24).reserve();
        assert!(reservation.copy_values(&[1.0, 2.0], "first").is_ok());
        assert!(reservation.copy_values(&[3.0], "second").is_ok());
        assert_eq!(
            reservation.copy_values(&[4.0], "third"),
            Err(SaberError::AllocationFailure("third"))
        );
    }

    #[test]
    fn test_names_are_charged_by_length() {
        let mut reservation = MemoryLimit::bytes(6).reserve();
        assert_eq!(reservation.copy_name("sand", "names").unwrap(), "sand");
        assert!(reservation.copy_name("algae", "names").is_err());
    }

    #[test]
    fn test_resize_zero_fills() {
        let mut reservation = MemoryLimit::unlimited().reserve();
        let mut buffer = vec![9.0; 2];
        reservation.resize(&mut buffer, 4, "resizing").unwrap();
        assert_eq!(buffer, vec![0.0; 4]);
    }
}
