use std::sync::OnceLock;

/// Square, non-negative weighting field summing to one.
#[derive(Clone, Debug)]
pub struct Kernel {
    values: Box<[f64]>,
    radius: i32,
    width: usize,
}

impl Kernel {
    /// Panics if the discretized weights do not sum to one within 1%.
    pub fn create(weight: impl Fn(i32, i32) -> f64, radius: i32) -> Self {
        assert!(radius >= 0, "kernel radius must be non-negative");
        let width = (2 * radius + 1) as usize;
        let mut values = vec![0.0; width * width];
        for dz in -radius..=radius {
            for dx in -radius..=radius {
                let i = (dx + radius) as usize + (dz + radius) as usize * width;
                values[i] = weight(dx, dz).max(0.0);
            }
        }
        let sum: f64 = values.iter().sum();
        assert!(
            (0.99..=1.01).contains(&sum),
            "kernel of radius {} sums to {}, expected ~1",
            radius,
            sum
        );
        Self {
            values: values.into_boxed_slice(),
            radius,
            width,
        }
    }

    #[inline]
    pub fn radius(&self) -> i32 {
        self.radius
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn weight(&self, dx: i32, dz: i32) -> f64 {
        let r = self.radius;
        self.values[(dx + r) as usize + (dz + r) as usize * self.width]
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Parabolic 9x9 kernel used at both blend resolutions.
pub fn kernel_9x9() -> &'static Kernel {
    static K: OnceLock<Kernel> = OnceLock::new();
    K.get_or_init(|| {
        Kernel::create(
            |x, z| 0.0211640211641 * (1.0 - 0.03125 * (x * x + z * z) as f64),
            4,
        )
    })
}

pub fn kernel_5x5() -> &'static Kernel {
    static K: OnceLock<Kernel> = OnceLock::new();
    K.get_or_init(|| Kernel::create(|x, z| 0.08 * (1.0 - 0.125 * (x * x + z * z) as f64), 2))
}
