/// Bounded per-layer sample storage.
///
/// Pushes beyond the capacity are refused and counted, so callers can report
/// how many observations a layer lost.
#[derive(Debug, Clone)]
pub struct SampleBuffer<T> {
    samples: Vec<T>,
    max_capacity: usize,
    dropped: usize,
}

impl<T> SampleBuffer<T> {
    pub fn with_capacity(max_capacity: usize) -> Self {
        Self {
            samples: Vec::new(),
            max_capacity,
            dropped: 0,
        }
    }

    /// Stores `sample`, returning `false` when the buffer is full.
    pub fn push(&mut self, sample: T) -> bool {
        if self.samples.len() < self.max_capacity {
            self.samples.push(sample);
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn as_slice(&self) -> &[T] {
        &self.samples
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_is_counted_not_stored() {
        let mut buffer = SampleBuffer::with_capacity(2);
        assert!(buffer.push(1));
        assert!(buffer.push(2));
        assert!(!buffer.push(3));
        assert!(!buffer.push(4));
        assert_eq!(buffer.as_slice(), &[1, 2]);
        assert_eq!(buffer.dropped(), 2);
        assert_eq!(buffer.capacity(), 2);
    }
}
