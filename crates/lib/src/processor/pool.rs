//! Transaction-owned processor instances.
//!
//! Templates belong to the configuration and are only ever borrowed; the
//! pool owns fresh instances created from them. Nothing that happens to the
//! persisted configuration during a build can invalidate an instance.

use tracing::debug;

use super::{BuildProcessor, ProcessorTemplate};

pub struct ProcessorPool {
  instances: Vec<Box<dyn BuildProcessor>>,
}

impl ProcessorPool {
  /// Create one instance per template, in template order.
  pub fn instantiate<T: ProcessorTemplate>(templates: &[T]) -> Self {
    let instances: Vec<Box<dyn BuildProcessor>> = templates.iter().map(ProcessorTemplate::instantiate).collect();
    debug!(count = instances.len(), "processor instances created");
    Self { instances }
  }

  pub fn len(&self) -> usize {
    self.instances.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instances.is_empty()
  }

  pub fn get_mut(&mut self, index: usize) -> Option<&mut (dyn BuildProcessor + 'static)> {
    self.instances.get_mut(index).map(|instance| instance.as_mut())
  }

  pub fn names(&self) -> Vec<String> {
    self.instances.iter().map(|p| p.name().to_string()).collect()
  }

  /// Release every instance. Consumes the pool so it can only happen once.
  pub fn destroy(self) {
    for instance in &self.instances {
      debug!(processor = %instance.name(), "destroying processor instance");
    }
    drop(self.instances);
  }
}
