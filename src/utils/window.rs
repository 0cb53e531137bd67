use alloc::boxed::Box;

/// A fixed-size circular buffer holding the trailing observations of a rolling window.
///
/// Values are pushed at the back; once the buffer holds `period` values every
/// push evicts and returns the oldest one.
#[derive(Debug, Clone)]
pub struct Window<T> {
    /// The buffer that stores the values
    buf: Box<[T]>,
    /// Index of the oldest value once full, next write position before that
    head: usize,
    /// Number of values currently held
    len: usize,
}

impl<T: Default + Copy> Window<T> {
    /// Creates a new window with the specified period, panics if period is 0
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "period can not be zero");

        Self {
            buf: vec![T::default(); period].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    /// Returns the period of the window
    #[inline]
    pub fn period(&self) -> usize {
        self.buf.len()
    }

    /// Returns the current number of values in the window
    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` once the window holds `period` values
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.period()
    }

    /// Pushes a new value into the window
    ///
    /// # Arguments
    ///
    /// * `value` - The value to push into the window
    ///
    /// # Returns
    ///
    /// * `Option<T>` - The evicted value if the window was already full
    pub fn push(&mut self, value: T) -> Option<T> {
        let period = self.period();

        if self.is_full() {
            let evicted = core::mem::replace(&mut self.buf[self.head], value);
            self.head = (self.head + 1) % period;
            Some(evicted)
        } else {
            self.buf[(self.head + self.len) % period] = value;
            self.len += 1;
            None
        }
    }

    /// Clears the window
    pub fn reset(&mut self) {
        self.buf.fill(T::default());
        self.head = 0;
        self.len = 0;
    }

    /// Returns an iterator over the values from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let period = self.period();
        (0..self.len).map(move |i| &self.buf[(self.head + i) % period])
    }
}
