//! # Engineering Equations
//!
//! The physical relations and numerical utilities the calculators are built
//! from. Keeping the formulas here, apart from input validation and result
//! assembly, makes each one checkable against its reference on its own.
//!
//! ## Modules
//!
//! - [`gas_dynamics`] - Isentropic nozzle flow (Mach/area, choked flow, ve)
//! - [`pressure_vessel`] - Cylinder, plate and fastener stresses
//! - [`numeric`] - Bounded root-finding, sampling and table interpolation
//!
//! ## Units
//!
//! SI throughout: Pa, K, m, kg, N, s.

pub mod gas_dynamics;
pub mod numeric;
pub mod pressure_vessel;

pub use gas_dynamics::{
    area_ratio_from_mach,
    characteristic_velocity,
    choked_mass_flux,
    exhaust_velocity,
    mach_from_area_ratio,
    mach_from_pressure_ratio,
    pressure_ratio_from_mach,
    temperature_ratio_from_mach,
    throat_conditions,
    thrust_coefficient,
    ChamberState,
    FlowBranch,
    ThroatConditions,
};

pub use pressure_vessel::{
    circle_area,
    closure_force,
    lame_inner_surface_stresses,
    plate_thickness,
    required_bolts,
    shear_yield,
    thin_wall_hoop_stress,
    thin_wall_longitudinal_stress,
    von_mises_stress,
};

pub use numeric::{bisect, interpolate, linspace};
