//! Read and reconcile pools through a [`ZpoolBackend`].

use crate::cache::TopologyCache;
use crate::command::{
    create_command, destroy_command, get_command, list_command, set_command, status_command,
};
use crate::drift::{diff_pool, DriftReport};
use crate::field::{Field, FieldValue};
use crate::topology::parse_topology;
use crate::CoreError;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use zpoolctl_runtime::{
    extract_topology_tokens, parse_pool_list, parse_property_value, ZpoolBackend,
    PROPERTY_UNAVAILABLE,
};
use zpoolctl_schema::{Category, PoolDescription, PoolName, PoolProperty, Topology};

type Getter<B> = fn(&mut PoolProvider<B>, Field, &str) -> Result<FieldValue, CoreError>;
type Setter<B> = fn(&mut PoolProvider<B>, Field, &str, &FieldValue) -> Result<(), CoreError>;

/// Getter and setter for one [`Field`].
struct Accessor<B: ?Sized> {
    get: Getter<B>,
    set: Setter<B>,
}

// Function pointers are always `Copy`; a derive would demand `B: Copy`.
impl<B: ?Sized> Clone for Accessor<B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized> Copy for Accessor<B> {}

/// What [`PoolProvider::apply`] changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "outcome", content = "fields")]
pub enum ApplyOutcome {
    Created,
    Updated(Vec<Field>),
    Unchanged,
}

/// Pool reader and mutator over one backend.
///
/// Topologies are parsed at most once per pool until a mutation through this
/// provider, or an explicit [`invalidate`](Self::invalidate), discards them.
pub struct PoolProvider<B: ?Sized> {
    backend: Box<B>,
    cache: TopologyCache,
    accessors: BTreeMap<Field, Accessor<B>>,
}

impl<B: ZpoolBackend + ?Sized> PoolProvider<B> {
    pub fn new(backend: Box<B>) -> Self {
        let mut accessors = BTreeMap::new();
        for field in Field::ALL {
            let accessor = if field.is_mutable() {
                Accessor {
                    get: Self::get_property_field as Getter<B>,
                    set: Self::set_property_field as Setter<B>,
                }
            } else {
                Accessor {
                    get: Self::get_topology_field as Getter<B>,
                    set: Self::refuse_topology_change as Setter<B>,
                }
            };
            accessors.insert(field, accessor);
        }
        Self {
            backend,
            cache: TopologyCache::new(),
            accessors,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Names of all imported pools.
    pub fn instances(&self) -> Result<Vec<PoolName>, CoreError> {
        let output = self.backend.zpool(&list_command())?;
        Ok(parse_pool_list(&output))
    }

    /// Parsed topology of `pool`, [`Topology::absent`] when it does not exist.
    pub fn current_pool(&mut self, pool: &str) -> Result<&Topology, CoreError> {
        if self.cache.is_valid(pool) {
            debug!("topology of {pool} served from cache");
        } else {
            let topology = self.query_topology(pool)?;
            self.cache.store(pool, topology);
        }
        self.cache
            .get(pool)
            .ok_or_else(|| CoreError::PoolNotFound(pool.to_owned()))
    }

    fn query_topology(&self, pool: &str) -> Result<Topology, CoreError> {
        let platform = self.backend.platform();
        let output = self.backend.run(&status_command(pool, platform))?;
        // A missing pool makes `zpool status` fail; that is the absent case.
        let tokens = if output.success {
            extract_topology_tokens(&output.stdout)
        } else {
            debug!("zpool status {pool}: {}", output.stderr.trim());
            Vec::new()
        };
        parse_topology(&tokens, platform, &*self.backend)
    }

    pub fn invalidate(&mut self, pool: &str) {
        self.cache.invalidate(pool);
    }

    pub fn exists(&mut self, pool: &str) -> Result<bool, CoreError> {
        Ok(!self.current_pool(pool)?.is_absent())
    }

    pub fn create(&mut self, desc: &PoolDescription) -> Result<(), CoreError> {
        let args = create_command(desc);
        info!("creating pool {}", desc.pool);
        self.cache.invalidate(&desc.pool);
        self.backend.zpool(&args)?;
        Ok(())
    }

    pub fn destroy(&mut self, pool: &str) -> Result<(), CoreError> {
        info!("destroying pool {pool}");
        self.cache.invalidate(pool);
        self.backend.zpool(&destroy_command(pool))?;
        Ok(())
    }

    /// Current value of `property`, `None` when the output names no such pool.
    ///
    /// A failed `ashift` query yields `-` instead of an error, since not
    /// every platform has that property.
    pub fn property(
        &self,
        pool: &str,
        property: PoolProperty,
    ) -> Result<Option<String>, CoreError> {
        let args = get_command(property.as_str(), pool);
        match self.backend.zpool(&args) {
            Ok(output) => Ok(parse_property_value(&output, pool)),
            Err(e) if property.platform_specific() => {
                warn!("{property} is unavailable on {pool}: {e}");
                Ok(Some(PROPERTY_UNAVAILABLE.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Values of every pool property, skipping those the pool does not report.
    pub fn properties(&self, pool: &str) -> Result<BTreeMap<PoolProperty, String>, CoreError> {
        let mut values = BTreeMap::new();
        for property in PoolProperty::ALL {
            if let Some(value) = self.property(pool, property)? {
                values.insert(property, value);
            }
        }
        Ok(values)
    }

    /// Run `zpool set`. A failed `ashift` change is logged and ignored.
    pub fn set_property(
        &mut self,
        pool: &str,
        property: PoolProperty,
        value: &str,
    ) -> Result<(), CoreError> {
        info!("setting {property}={value} on {pool}");
        self.cache.invalidate(pool);
        match self.backend.zpool(&set_command(property.as_str(), value, pool)) {
            Ok(_) => Ok(()),
            Err(e) if property.platform_specific() => {
                warn!("cannot set {property} on {pool}: {e}");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read one field of `pool`.
    pub fn get(&mut self, pool: &str, field: Field) -> Result<FieldValue, CoreError> {
        let accessor = self.accessor(field);
        (accessor.get)(self, field, pool)
    }

    /// Write one field of `pool`. Vdev fields always fail with
    /// [`CoreError::ImmutableField`].
    pub fn set(&mut self, pool: &str, field: Field, value: &FieldValue) -> Result<(), CoreError> {
        let accessor = self.accessor(field);
        (accessor.set)(self, field, pool, value)
    }

    fn accessor(&self, field: Field) -> Accessor<B> {
        // Every field gets an accessor in `new`.
        self.accessors[&field]
    }

    fn get_topology_field(&mut self, field: Field, pool: &str) -> Result<FieldValue, CoreError> {
        let category = topology_category(field)?;
        Ok(FieldValue::from_groups(
            self.current_pool(pool)?.group(category),
        ))
    }

    fn refuse_topology_change(
        &mut self,
        field: Field,
        pool: &str,
        value: &FieldValue,
    ) -> Result<(), CoreError> {
        let current = self.get_topology_field(field, pool)?;
        Err(CoreError::ImmutableField {
            field,
            should: value.to_string(),
            current: current.to_string(),
        })
    }

    fn get_property_field(&mut self, field: Field, pool: &str) -> Result<FieldValue, CoreError> {
        let property = pool_property(field)?;
        Ok(FieldValue::from_scalar(
            self.property(pool, property)?.as_deref(),
        ))
    }

    fn set_property_field(
        &mut self,
        field: Field,
        pool: &str,
        value: &FieldValue,
    ) -> Result<(), CoreError> {
        let property = pool_property(field)?;
        match value {
            FieldValue::Scalar(v) => self.set_property(pool, property, v),
            other => Err(CoreError::InvalidValue {
                field,
                value: other.to_string(),
            }),
        }
    }

    /// Compare `desc` with the live pool.
    pub fn diff(&mut self, desc: &PoolDescription) -> Result<DriftReport, CoreError> {
        let topology = self.current_pool(&desc.pool)?.clone();
        let properties = if topology.is_absent() {
            BTreeMap::new()
        } else {
            self.properties(&desc.pool)?
        };
        Ok(diff_pool(desc, &topology, &properties))
    }

    /// Bring the pool in line with `desc`.
    ///
    /// A missing pool is created. An existing pool has its drifted properties
    /// set, unless some vdev field drifted, in which case nothing is changed
    /// and the first such field is reported.
    pub fn apply(&mut self, desc: &PoolDescription) -> Result<ApplyOutcome, CoreError> {
        let report = self.diff(desc)?;
        if !report.exists {
            self.create(desc)?;
            return Ok(ApplyOutcome::Created);
        }

        if let Some(entry) = report.immutable().next() {
            return Err(CoreError::ImmutableField {
                field: entry.field,
                should: entry.desired.to_string(),
                current: entry.current.to_string(),
            });
        }

        let mut updated = Vec::new();
        for entry in report.mutable() {
            self.set(&desc.pool, entry.field, &entry.desired)?;
            updated.push(entry.field);
        }
        if updated.is_empty() {
            debug!("pool {} is up to date", desc.pool);
            Ok(ApplyOutcome::Unchanged)
        } else {
            Ok(ApplyOutcome::Updated(updated))
        }
    }
}

fn topology_category(field: Field) -> Result<Category, CoreError> {
    field.category().ok_or_else(|| CoreError::InvalidValue {
        field,
        value: "not a vdev field".to_owned(),
    })
}

fn pool_property(field: Field) -> Result<PoolProperty, CoreError> {
    field.property().ok_or_else(|| CoreError::InvalidValue {
        field,
        value: "not a pool property".to_owned(),
    })
}
