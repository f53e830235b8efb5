// ==============================================================================
// materials.rs — SURFACE MATERIALS + CONTACT MATERIAL TABLE
// ------------------------------------------------------------------------------
// Every collider the world creates carries a surface material id in its
// `user_data`. A ContactMaterial pairs two surfaces with friction,
// restitution and contact stiffness; exactly one may exist per unordered pair.
//
// The table doubles as the rapier PhysicsHooks: for each solver contact
// between two registered surfaces it overrides friction and restitution with
// the pair's values. Unregistered pairs keep the collider defaults, which is
// why the world validates its pairs at setup time.
// ==============================================================================

use std::collections::HashMap;

use rapier3d::prelude::*;
use serde::Serialize;

use crate::error::{Result, SimError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MaterialId(pub u32);

impl MaterialId {
    pub fn to_user_data(self) -> u128 {
        self.0 as u128
    }

    pub fn from_user_data(data: u128) -> Self {
        Self(data as u32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceMaterial {
    pub id: MaterialId,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactMaterial {
    pub a: MaterialId,
    pub b: MaterialId,
    pub friction: Real,
    pub restitution: Real,
    /// Stored with the pair; rapier's solver softness is global, so the
    /// value is carried for inspection rather than applied per contact.
    pub contact_stiffness: Real,
}

impl ContactMaterial {
    pub fn new(a: MaterialId, b: MaterialId) -> Self {
        Self {
            a,
            b,
            friction: 0.3,
            restitution: 0.3,
            contact_stiffness: 1e7,
        }
    }

    pub fn friction(mut self, friction: Real) -> Self {
        self.friction = friction;
        self
    }

    pub fn restitution(mut self, restitution: Real) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn contact_stiffness(mut self, stiffness: Real) -> Self {
        self.contact_stiffness = stiffness;
        self
    }

    fn key(&self) -> (MaterialId, MaterialId) {
        pair_key(self.a, self.b)
    }
}

#[inline]
fn pair_key(a: MaterialId, b: MaterialId) -> (MaterialId, MaterialId) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Debug, Default)]
pub struct MaterialTable {
    surfaces: Vec<SurfaceMaterial>,
    pairs: HashMap<(MaterialId, MaterialId), ContactMaterial>,
}

impl MaterialTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, name: &str) -> MaterialId {
        let id = MaterialId(self.surfaces.len() as u32);
        self.surfaces.push(SurfaceMaterial {
            id,
            name: name.to_string(),
        });
        id
    }

    pub fn surface(&self, id: MaterialId) -> Option<&SurfaceMaterial> {
        self.surfaces.get(id.0 as usize)
    }

    pub fn name(&self, id: MaterialId) -> String {
        self.surface(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| format!("#{}", id.0))
    }

    pub fn register(&mut self, pair: ContactMaterial) -> Result<()> {
        for id in [pair.a, pair.b] {
            if self.surface(id).is_none() {
                return Err(SimError::UnknownMaterial(id));
            }
        }

        let key = pair.key();
        if self.pairs.contains_key(&key) {
            return Err(SimError::DuplicateContactMaterial {
                a: self.name(pair.a),
                b: self.name(pair.b),
            });
        }

        self.pairs.insert(key, pair);
        Ok(())
    }

    pub fn lookup(&self, a: MaterialId, b: MaterialId) -> Option<&ContactMaterial> {
        self.pairs.get(&pair_key(a, b))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl PhysicsHooks for MaterialTable {
    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let a = MaterialId::from_user_data(context.colliders[context.collider1].user_data);
        let b = MaterialId::from_user_data(context.colliders[context.collider2].user_data);

        let Some(pair) = self.lookup(a, b) else {
            return;
        };

        for contact in context.solver_contacts.iter_mut() {
            contact.friction = pair.friction;
            contact.restitution = pair.restitution;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_lookup_is_order_independent() {
        let mut table = MaterialTable::new();
        let wheel = table.create("wheel");
        let ground = table.create("ground");
        table
            .register(ContactMaterial::new(wheel, ground).friction(0.3).restitution(0.0))
            .unwrap();

        let forward = table.lookup(wheel, ground).unwrap();
        let reverse = table.lookup(ground, wheel).unwrap();
        assert_eq!(forward, reverse);
        assert_eq!(forward.friction, 0.3);
        assert_eq!(forward.restitution, 0.0);
    }

    #[test]
    fn second_registration_of_a_pair_is_rejected() {
        let mut table = MaterialTable::new();
        let wheel = table.create("wheel");
        let ground = table.create("ground");
        table.register(ContactMaterial::new(wheel, ground)).unwrap();

        let err = table.register(ContactMaterial::new(ground, wheel)).unwrap_err();
        assert!(matches!(err, SimError::DuplicateContactMaterial { .. }));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn unknown_material_is_rejected() {
        let mut table = MaterialTable::new();
        let wheel = table.create("wheel");
        let err = table
            .register(ContactMaterial::new(wheel, MaterialId(7)))
            .unwrap_err();
        assert!(matches!(err, SimError::UnknownMaterial(MaterialId(7))));
    }

    #[test]
    fn user_data_round_trip_keeps_the_id() {
        assert_eq!(MaterialId::from_user_data(MaterialId(3).to_user_data()), MaterialId(3));
    }
}
