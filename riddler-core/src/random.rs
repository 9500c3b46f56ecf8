use rand::{Rng, RngCore};

// Uniform draws in `[0, 1)`.
pub trait UniformSource {
    fn next_unit(&mut self) -> f64;

    fn fill_unit(&mut self, out: &mut [f64]) {
        for v in out.iter_mut() {
            *v = self.next_unit();
        }
    }
}

impl<R: RngCore> UniformSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

#[derive(Debug, Clone)]
pub struct CyclicSource {
    values: Vec<f64>,
    pos: usize,
}

impl CyclicSource {
    // An empty sequence replays zeros.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }

    pub fn repeating(value: f64) -> Self {
        Self::new(vec![value])
    }
}

impl UniformSource for CyclicSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos];
        self.pos = (self.pos + 1) % self.values.len();
        v
    }
}
