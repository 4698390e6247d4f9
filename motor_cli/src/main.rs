//! # Motor Sizing CLI
//!
//! Command-line front end for `motor_core`. Flags use the units of the
//! design worksheets (mm, MPa, cm, %) and are converted to SI before any
//! calculation runs.
//!
//! ```text
//! motor_cli nozzle --p0-mpa 6.106 --t0-k 1601.209 --gamma 1.136397 --gas-constant 234.918 --thrust-n 544.81
//! motor_cli structure --wall-mm 3.175 --outer-diameter-mm 76.2 --pressure-mpa 7 ...
//! motor_cli performance --apogee-m 500 --burn-s 1 --empty-kg 2.5 --fraction-pct 14 --diameter-cm 5 --cd 0.45
//! motor_cli --json run --input request.json
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use motor_core::calculations::{
    evaluate_with, CalculationOutput, CalculationRequest, ContourType, MassFractionBasis, NozzleGeometry, NozzleSpec,
    PerformanceResult, PerformanceSpec, PressureVesselSpec, StressResult, WallModel,
};
use motor_core::config::{self, EngineConfig};
use motor_core::equations::ChamberState;
use motor_core::units::{MegaPascals, Meters, Millimeters, Pascals};

#[derive(Parser)]
#[command(name = "motor_cli", version)]
#[command(about = "Rocket motor sizing: nozzle, case structure, required impulse")]
struct Cli {
    /// TOML file overriding engine constants
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the result as JSON instead of a report
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Size a nozzle for a thrust target
    Nozzle {
        /// Chamber stagnation pressure (MPa)
        #[arg(long)]
        p0_mpa: f64,

        /// Chamber stagnation temperature (K)
        #[arg(long)]
        t0_k: f64,

        /// Ratio of specific heats
        #[arg(long)]
        gamma: f64,

        /// Specific gas constant (J/kg·K)
        #[arg(long)]
        gas_constant: f64,

        /// Thrust target (N)
        #[arg(long)]
        thrust_n: f64,

        /// Ambient pressure (Pa)
        #[arg(long, default_value_t = 101_325.0)]
        ambient_pa: f64,

        /// Wall contour
        #[arg(long, value_enum, default_value_t = ContourArg::Conical)]
        contour: ContourArg,

        /// Expansion ratio override (optimum expansion when omitted)
        #[arg(long)]
        expansion_ratio: Option<f64>,
    },

    /// Verify a motor case, bulkhead and retaining bolts
    Structure {
        /// Case wall thickness (mm)
        #[arg(long)]
        wall_mm: f64,

        /// Case outer diameter (mm)
        #[arg(long)]
        outer_diameter_mm: f64,

        /// Maximum expected operating pressure (MPa)
        #[arg(long)]
        pressure_mpa: f64,

        /// Case yield strength (MPa)
        #[arg(long)]
        case_yield_mpa: f64,

        /// Bulkhead yield strength (MPa)
        #[arg(long)]
        bulkhead_yield_mpa: f64,

        /// Bolt nominal diameter (mm)
        #[arg(long)]
        bolt_mm: f64,

        /// Bolt hole diameter (mm); defaults to the bolt diameter
        #[arg(long)]
        hole_mm: Option<f64>,

        /// Bolt yield strength (MPa)
        #[arg(long)]
        bolt_yield_mpa: f64,

        /// Design factor of safety for bulkhead and bolts
        #[arg(long)]
        design_factor: Option<f64>,

        /// Use Lamé thick-wall stresses
        #[arg(long, default_value_t = false)]
        thick_wall: bool,
    },

    /// Required impulse for a target apogee
    Performance {
        /// Target apogee (m)
        #[arg(long)]
        apogee_m: f64,

        /// Burn time (s)
        #[arg(long)]
        burn_s: f64,

        /// Empty vehicle mass (kg)
        #[arg(long)]
        empty_kg: f64,

        /// Propellant mass fraction (%)
        #[arg(long)]
        fraction_pct: f64,

        /// Body diameter (cm)
        #[arg(long)]
        diameter_cm: f64,

        /// Drag coefficient
        #[arg(long)]
        cd: f64,

        /// Read the mass fraction against liftoff mass instead of empty mass
        #[arg(long, default_value_t = false)]
        liftoff_basis: bool,
    },

    /// Evaluate a JSON calculation request
    Run {
        /// Request file, or `-` for stdin
        #[arg(long)]
        input: String,
    },
}

#[derive(Copy, Clone, ValueEnum, Debug)]
enum ContourArg {
    Conical,
    Parabolic,
}

impl From<ContourArg> for ContourType {
    fn from(arg: ContourArg) -> Self {
        match arg {
            ContourArg::Conical => ContourType::Conical,
            ContourArg::Parabolic => ContourType::Parabolic,
        }
    }
}

/// Initialize tracing on stderr so stdout carries only the result
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "motor_core=info,motor_cli=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let engine_config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => config::defaults().clone(),
    };

    let request = build_request(cli.command)?;
    tracing::debug!(operation = request.operation(), "request built");

    match evaluate_with(&request, &engine_config) {
        Ok(output) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                print_report(&output);
            }
            Ok(())
        }
        Err(err) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "error": &err }))?);
            }
            Err(anyhow::Error::new(err).context(format!("{} failed", request.operation())))
        }
    }
}

fn build_request(command: Commands) -> anyhow::Result<CalculationRequest> {
    let request = match command {
        Commands::Nozzle {
            p0_mpa,
            t0_k,
            gamma,
            gas_constant,
            thrust_n,
            ambient_pa,
            contour,
            expansion_ratio,
        } => CalculationRequest::DesignNozzle {
            chamber: ChamberState {
                p0_pa: Pascals::from(MegaPascals(p0_mpa)).value(),
                t0_k,
                gamma,
                r_j_per_kg_k: gas_constant,
            },
            spec: NozzleSpec {
                thrust_target_n: thrust_n,
                ambient_pressure_pa: ambient_pa,
                contour_type: contour.into(),
                expansion_ratio,
            },
        },

        Commands::Structure {
            wall_mm,
            outer_diameter_mm,
            pressure_mpa,
            case_yield_mpa,
            bulkhead_yield_mpa,
            bolt_mm,
            hole_mm,
            bolt_yield_mpa,
            design_factor,
            thick_wall,
        } => {
            let mut spec = PressureVesselSpec::from_presentation_units(
                wall_mm,
                outer_diameter_mm,
                pressure_mpa,
                case_yield_mpa,
                bulkhead_yield_mpa,
                bolt_mm,
                hole_mm.unwrap_or(bolt_mm),
                bolt_yield_mpa,
            );
            spec.design_factor = design_factor;
            if thick_wall {
                spec.wall_model = WallModel::ThickWall;
            }
            CalculationRequest::AnalyzeStructure { spec }
        }

        Commands::Performance {
            apogee_m,
            burn_s,
            empty_kg,
            fraction_pct,
            diameter_cm,
            cd,
            liftoff_basis,
        } => {
            let mut spec = PerformanceSpec::from_presentation_units(apogee_m, burn_s, empty_kg, fraction_pct, diameter_cm, cd);
            if liftoff_basis {
                spec.mass_fraction_basis = MassFractionBasis::LiftoffMass;
            }
            CalculationRequest::SolvePerformance { spec }
        }

        Commands::Run { input } => {
            let text = if input == "-" {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("reading request from stdin")?;
                buffer
            } else {
                std::fs::read_to_string(&input).with_context(|| format!("reading request '{}'", input))?
            };
            serde_json::from_str(&text).context("parsing calculation request")?
        }
    };
    Ok(request)
}

// ============================================================================
// Reports
// ============================================================================

fn mm(meters: f64) -> f64 {
    Millimeters::from(Meters(meters)).value()
}

fn mpa(pascals: f64) -> f64 {
    MegaPascals::from(Pascals(pascals)).value()
}

fn banner(title: &str) {
    println!("═══════════════════════════════════════");
    println!("  {}", title);
    println!("═══════════════════════════════════════");
    println!();
}

fn print_report(output: &CalculationOutput) {
    match output {
        CalculationOutput::Nozzle(nozzle) => print_nozzle(nozzle),
        CalculationOutput::Structure(stress) => print_structure(stress),
        CalculationOutput::Performance(performance) => print_performance(performance),
    }

    let warnings = output.warnings();
    if !warnings.is_empty() {
        println!();
        println!("Advisories:");
        for warning in warnings {
            println!("  ⚠ {}", warning);
        }
    }
}

fn print_nozzle(n: &NozzleGeometry) {
    banner("NOZZLE DESIGN");
    println!("Geometry:");
    println!("  Throat radius:   {:.3} mm", mm(n.throat_radius_m));
    println!("  Exit radius:     {:.3} mm", mm(n.exit_radius_m));
    println!("  Length:          {:.3} mm", mm(n.axial_length_m));
    println!("  Expansion ratio: {:.3}", n.expansion_ratio);
    println!(
        "  Wall angles:     {:.1}° initial, {:.1}° exit",
        n.initial_wall_angle_deg, n.exit_wall_angle_deg
    );
    println!();
    println!("Flow:");
    println!("  Throat:          {:.1} K, {:.1} m/s", n.throat_temperature_k, n.throat_velocity_m_s);
    println!(
        "  Exit:            M {:.3}, {:.0} Pa, {:.1} K",
        n.exit_mach, n.exit_pressure_pa, n.exit_temperature_k
    );
    println!("  Exhaust vel.:    {:.1} m/s", n.exhaust_velocity_m_s);
    println!("  Mass flow:       {:.4} kg/s", n.mass_flow_kg_s);
    println!("  c*:              {:.1} m/s", n.characteristic_velocity_m_s);
    println!("  Cf:              {:.4}", n.thrust_coefficient);
    println!("  Isp (ideal):     {:.1} s", n.specific_impulse_s);
    println!();
    println!("Contour: {} stations (use --json for coordinates)", n.contour_points.len());
}

fn print_structure(s: &StressResult) {
    banner("STRUCTURAL VERIFICATION");
    println!("Case ({:?}, di = {:.2} mm):", s.wall_model, mm(s.inner_diameter_m));
    println!("  Hoop:            {:.1} MPa", mpa(s.hoop_stress_pa));
    println!("  Longitudinal:    {:.1} MPa", mpa(s.longitudinal_stress_pa));
    println!("  Radial:          {:.1} MPa", mpa(s.radial_stress_pa));
    println!("  Von Mises:       {:.1} MPa", mpa(s.von_mises_stress_pa));
    println!("  FS:              {:.2}", s.factor_of_safety);
    println!();
    println!("Bulkhead (FS {:.1}):", s.design_factor);
    println!("  Thickness:       {:.2} mm", mm(s.bulkhead_thickness_m));
    println!();
    println!("Bolts:");
    println!("  Closure force:   {:.0} N", s.bolt_axial_force_n);
    println!("  Required:        {:.2} → {} bolts", s.bolt_count_required, s.bolt_count);
    println!(
        "  Shear:           {:.1} MPa (allowable {:.1} MPa, FS {:.2})",
        mpa(s.bolt_shear_stress_pa),
        mpa(s.allowable_bolt_shear_pa),
        s.bolt_factor_of_safety
    );
    println!(
        "  Bearing:         {:.1} MPa (FS {:.2})",
        mpa(s.bearing_stress_pa),
        s.bearing_factor_of_safety
    );
    println!(
        "  Net section:     {:.1} MPa (FS {:.2})",
        mpa(s.net_section_stress_pa),
        s.net_section_factor_of_safety
    );
    println!();
    println!("Status: {}", if s.passes() { "✓ PASS" } else { "✗ CHECK ADVISORIES" });
}

fn print_performance(p: &PerformanceResult) {
    banner("PERFORMANCE SIZING");
    println!("Motor:");
    println!("  Total impulse:   {:.1} N·s ({})", p.total_impulse_ns, p.motor_class);
    println!("  Average thrust:  {:.1} N", p.average_thrust_n);
    println!("  Required Isp:    {:.1} s", p.specific_impulse_s);
    println!("  Propellant:      {:.3} kg", p.propellant_mass_kg);
    println!();
    println!("Flight:");
    println!(
        "  Burnout:         {:.1} m/s (M {:.2}) at {:.1} m",
        p.burnout_velocity_m_s, p.burnout_mach, p.burnout_altitude_m
    );
    println!("  Apogee:          {:.1} m at {:.1} s", p.peak_altitude_m, p.time_to_apogee_s);
    println!("  Max accel.:      {:.1} g", p.max_acceleration_g);
    println!();
    let f = &p.drag_factors;
    println!("Drag (N = {:.1}, {} iterations):", p.drag_influence_number, p.iterations);
    println!(
        "  fz {:.3}  fzbo {:.3}  fv {:.3}  ft {:.3}",
        f.altitude, f.burnout_altitude, f.velocity, f.time
    );
}
