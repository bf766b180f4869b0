use log::debug;

use super::CollisionMatrixError;
use crate::grid::{GridAddress, IrGridPoints, Mesh, TripletsAtQ, ir_grid_points};
use crate::interaction::InteractionProvider;
use crate::symmetry::Symmetry;

/// Everything derived from the choice of grid point: triplets, irreducible
/// q-points and the lookup from triplet-map values to triplet indices.
#[derive(Debug, Clone)]
pub struct GridPointContext {
    grid_point: usize,
    mesh: Mesh,
    triplets: TripletsAtQ,
    grid_address: Vec<GridAddress>,
    ir_grid_points: IrGridPoints,
    /// Dense over the mesh: `gp2tpindex[rep] = Some(ti)` for every distinct
    /// triplet-map value `rep`, in ascending order of `rep`.
    gp2tpindex: Vec<Option<usize>>,
}

impl GridPointContext {
    /// Targets `interaction` at `grid_point` and validates what it returns
    /// against the mesh and the reciprocal operations of `symmetry`.
    pub fn build<P: InteractionProvider>(
        interaction: &mut P,
        symmetry: &Symmetry,
        grid_point: usize,
    ) -> Result<Self, CollisionMatrixError> {
        let mesh = interaction.mesh();
        mesh.check_grid_point(grid_point)?;
        let num_gp = mesh.num_grid_points();

        if let Some(index) = symmetry
            .reciprocal_operations()
            .lattice()
            .iter()
            .position(|r| !mesh.is_preserved_by(r))
        {
            return Err(CollisionMatrixError::SymmetryInconsistency(format!(
                "reciprocal operation {index} does not map mesh {:?} onto itself",
                mesh.dims()
            )));
        }

        let triplets = interaction.set_grid_point(grid_point)?;
        let grid_address = interaction.grid_address().to_vec();
        if grid_address.len() != num_gp {
            return Err(CollisionMatrixError::SymmetryInconsistency(format!(
                "grid address table has {} entries for a mesh of {} points",
                grid_address.len(),
                num_gp
            )));
        }
        if let Some(gp) = (0..num_gp).find(|&gp| mesh.grid_point(&grid_address[gp]) != gp) {
            return Err(CollisionMatrixError::SymmetryInconsistency(format!(
                "grid address {:?} does not map back to grid point {gp}",
                grid_address[gp].as_slice()
            )));
        }

        let gp2tpindex = dense_triplet_index(&triplets.map, num_gp)?;
        let num_unique = gp2tpindex.iter().flatten().count();
        if num_unique != triplets.len() {
            return Err(CollisionMatrixError::SymmetryInconsistency(format!(
                "triplet map has {} representatives but {} triplets were given",
                num_unique,
                triplets.len()
            )));
        }

        let ir_grid_points = ir_grid_points(&mesh, &symmetry.reciprocal_mesh_rotations(&mesh))?;
        debug!(
            "grid point {grid_point}: {} triplets, {} irreducible q-points on mesh {:?}",
            triplets.len(),
            ir_grid_points.grid_points.len(),
            mesh.dims()
        );

        Ok(Self {
            grid_point,
            mesh,
            triplets,
            grid_address,
            ir_grid_points,
            gp2tpindex,
        })
    }

    pub fn grid_point(&self) -> usize {
        self.grid_point
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn triplets(&self) -> &TripletsAtQ {
        &self.triplets
    }

    pub fn grid_address(&self) -> &[GridAddress] {
        &self.grid_address
    }

    pub fn ir_grid_points(&self) -> &IrGridPoints {
        &self.ir_grid_points
    }

    pub fn num_ir_grid_points(&self) -> usize {
        self.ir_grid_points.grid_points.len()
    }

    /// Index of the triplet whose representative covers grid point `gp`.
    pub fn triplet_index(&self, gp: usize) -> Result<usize, CollisionMatrixError> {
        let rep = *self.triplets.map.get(gp).ok_or_else(|| {
            CollisionMatrixError::SymmetryInconsistency(format!(
                "grid point {gp} is outside the triplet map"
            ))
        })?;
        self.gp2tpindex[rep].ok_or_else(|| {
            CollisionMatrixError::SymmetryInconsistency(format!(
                "grid point {gp} maps to {rep}, which represents no triplet"
            ))
        })
    }
}

/// Builds the dense `representative -> triplet index` lookup.
///
/// Representatives must lie on the mesh and map to themselves.
fn dense_triplet_index(
    map: &[usize],
    num_gp: usize,
) -> Result<Vec<Option<usize>>, CollisionMatrixError> {
    if map.len() != num_gp {
        return Err(CollisionMatrixError::SymmetryInconsistency(format!(
            "triplet map has {} entries for a mesh of {} points",
            map.len(),
            num_gp
        )));
    }
    let mut is_rep = vec![false; num_gp];
    for (gp, &rep) in map.iter().enumerate() {
        if rep >= num_gp || map[rep] != rep {
            return Err(CollisionMatrixError::SymmetryInconsistency(format!(
                "grid point {gp} maps to {rep}, which is not its own representative"
            )));
        }
        is_rep[rep] = true;
    }
    let mut gp2tpindex = vec![None; num_gp];
    for (ti, rep) in (0..num_gp).filter(|&gp| is_rep[gp]).enumerate() {
        gp2tpindex[rep] = Some(ti);
    }
    Ok(gp2tpindex)
}
