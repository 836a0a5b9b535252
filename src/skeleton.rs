//! Bone rig and transform snapshots
//!
//! The engine exposes a periodically-sampled list of bone transforms
//! for inspection panels; no rendering happens here. The rig is a
//! small humanoid hierarchy posed by blending the rest pose against
//! the active gesture clip's held pose, weighted by the mixer's
//! gesture weight.

/// A single bone's local pose as carried by a clip
#[derive(Debug, Clone, PartialEq)]
pub struct BonePose {
    pub bone: String,
    /// Local position (x, y, z)
    pub position: [f32; 3],
    /// Local rotation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

/// Snapshot entry handed to the bone-inspection read channel
#[derive(Debug, Clone, PartialEq)]
pub struct BoneTransform {
    pub name: String,
    /// Local position relative to the parent bone
    pub position: [f32; 3],
    /// Local rotation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
    /// Accumulated world-space position, when requested
    pub world_position: Option<[f32; 3]>,
}

const IDENTITY: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

#[derive(Debug, Clone)]
struct Bone {
    name: &'static str,
    /// Index of the parent bone; parents always precede children
    parent: Option<usize>,
    rest_position: [f32; 3],
    rest_rotation: [f32; 4],
    position: [f32; 3],
    rotation: [f32; 4],
}

impl Bone {
    fn new(name: &'static str, parent: Option<usize>, rest_position: [f32; 3]) -> Self {
        Self {
            name,
            parent,
            rest_position,
            rest_rotation: IDENTITY,
            position: rest_position,
            rotation: IDENTITY,
        }
    }
}

/// Small humanoid rig with a fingerspelling-capable right hand
#[derive(Debug, Clone)]
pub struct Skeleton {
    bones: Vec<Bone>,
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::humanoid()
    }
}

impl Skeleton {
    /// Default rig: torso chain, both arms, articulated right hand
    pub fn humanoid() -> Self {
        let mut bones = Vec::new();
        let mut add = |name, parent, pos| {
            bones.push(Bone::new(name, parent, pos));
            bones.len() - 1
        };

        let hips = add("Hips", None, [0.0, 1.0, 0.0]);
        let spine = add("Spine", Some(hips), [0.0, 0.1, 0.0]);
        let chest = add("Chest", Some(spine), [0.0, 0.15, 0.0]);
        let neck = add("Neck", Some(chest), [0.0, 0.12, 0.0]);
        let _head = add("Head", Some(neck), [0.0, 0.1, 0.0]);

        let shoulder_r = add("Shoulder.R", Some(chest), [-0.08, 0.1, 0.0]);
        let upper_r = add("UpperArm.R", Some(shoulder_r), [-0.12, 0.0, 0.0]);
        let lower_r = add("LowerArm.R", Some(upper_r), [-0.25, 0.0, 0.0]);
        let hand_r = add("Hand.R", Some(lower_r), [-0.22, 0.0, 0.0]);
        let _ = add("Thumb.R", Some(hand_r), [-0.03, 0.0, 0.03]);
        let _ = add("Index.R", Some(hand_r), [-0.08, 0.0, 0.02]);
        let _ = add("Middle.R", Some(hand_r), [-0.09, 0.0, 0.0]);
        let _ = add("Ring.R", Some(hand_r), [-0.08, 0.0, -0.02]);
        let _ = add("Little.R", Some(hand_r), [-0.07, 0.0, -0.03]);

        let shoulder_l = add("Shoulder.L", Some(chest), [0.08, 0.1, 0.0]);
        let upper_l = add("UpperArm.L", Some(shoulder_l), [0.12, 0.0, 0.0]);
        let lower_l = add("LowerArm.L", Some(upper_l), [0.25, 0.0, 0.0]);
        let _ = add("Hand.L", Some(lower_l), [0.22, 0.0, 0.0]);

        Self { bones }
    }

    /// Number of bones in the rig
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Return every bone to its rest pose
    pub fn reset(&mut self) {
        for bone in &mut self.bones {
            bone.position = bone.rest_position;
            bone.rotation = bone.rest_rotation;
        }
    }

    /// Pose the rig by blending rest pose toward a clip pose.
    ///
    /// `weight` is the mixer's gesture weight in [0, 1]; bones absent
    /// from the pose stay at rest. Unknown bone names are ignored.
    pub fn apply_blend(&mut self, pose: &[BonePose], weight: f32) {
        self.reset();
        let w = weight.clamp(0.0, 1.0);
        if w == 0.0 {
            return;
        }
        for entry in pose {
            if let Some(bone) = self.bones.iter_mut().find(|b| b.name == entry.bone) {
                bone.position = lerp3(bone.rest_position, entry.position, w);
                bone.rotation = nlerp(bone.rest_rotation, entry.rotation, w);
            }
        }
    }

    /// Current transform list, optionally with accumulated world
    /// positions (parents are guaranteed to precede children).
    pub fn snapshot(&self, with_world: bool) -> Vec<BoneTransform> {
        let mut world_pos: Vec<[f32; 3]> = Vec::with_capacity(self.bones.len());
        let mut world_rot: Vec<[f32; 4]> = Vec::with_capacity(self.bones.len());
        let mut out = Vec::with_capacity(self.bones.len());

        for bone in &self.bones {
            let (pos, rot) = match bone.parent {
                Some(p) => (
                    add3(world_pos[p], quat_rotate(world_rot[p], bone.position)),
                    quat_mul(world_rot[p], bone.rotation),
                ),
                None => (bone.position, bone.rotation),
            };
            world_pos.push(pos);
            world_rot.push(rot);

            out.push(BoneTransform {
                name: bone.name.to_string(),
                position: bone.position,
                rotation: bone.rotation,
                world_position: with_world.then_some(pos),
            });
        }
        out
    }
}

fn add3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

fn lerp3(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + (b[0] - a[0]) * t,
        a[1] + (b[1] - a[1]) * t,
        a[2] + (b[2] - a[2]) * t,
    ]
}

/// Normalized quaternion lerp, taking the shorter arc
fn nlerp(a: [f32; 4], b: [f32; 4], t: f32) -> [f32; 4] {
    let dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3];
    let sign = if dot < 0.0 { -1.0 } else { 1.0 };
    let mut q = [
        a[0] + (sign * b[0] - a[0]) * t,
        a[1] + (sign * b[1] - a[1]) * t,
        a[2] + (sign * b[2] - a[2]) * t,
        a[3] + (sign * b[3] - a[3]) * t,
    ];
    let len = (q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3]).sqrt();
    if len <= f32::EPSILON {
        return IDENTITY;
    }
    for c in &mut q {
        *c /= len;
    }
    q
}

fn quat_mul(a: [f32; 4], b: [f32; 4]) -> [f32; 4] {
    let (ax, ay, az, aw) = (a[0], a[1], a[2], a[3]);
    let (bx, by, bz, bw) = (b[0], b[1], b[2], b[3]);
    [
        aw * bx + ax * bw + ay * bz - az * by,
        aw * by - ax * bz + ay * bw + az * bx,
        aw * bz + ax * by - ay * bx + az * bw,
        aw * bw - ax * bx - ay * by - az * bz,
    ]
}

fn quat_rotate(q: [f32; 4], v: [f32; 3]) -> [f32; 3] {
    // v' = q * (v, 0) * q^-1 for a unit quaternion
    let p = [v[0], v[1], v[2], 0.0];
    let qc = [-q[0], -q[1], -q[2], q[3]];
    let r = quat_mul(quat_mul(q, p), qc);
    [r[0], r[1], r[2]]
}
